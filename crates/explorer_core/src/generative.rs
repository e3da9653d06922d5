//! Boundary to the model that turns a prompt into streamed function calls.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Serialize;
use shared::{
    domain::AppMode,
    protocol::{tool_declarations, FunctionCall, FunctionDeclaration},
};

use crate::{
    error::TransportError,
    prompts::{query_prompt, system_instructions},
};

pub type FunctionCallStream = BoxStream<'static, Result<FunctionCall, TransportError>>;

#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_instructions: String,
    pub tools: Vec<FunctionDeclaration>,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn for_query(prompt: &str, mode: AppMode, temperature: f32) -> Self {
        Self {
            prompt: query_prompt(prompt, mode),
            system_instructions: system_instructions(mode),
            tools: tool_declarations(),
            temperature,
        }
    }
}

#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Starts one generation. The stream yields calls in the order the model
    /// produced them and ends after the last one or the first error.
    async fn stream_function_calls(
        &self,
        request: GenerationRequest,
    ) -> Result<FunctionCallStream, TransportError>;
}

pub struct MissingGenerativeClient {
    reason: String,
}

impl MissingGenerativeClient {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl GenerativeClient for MissingGenerativeClient {
    async fn stream_function_calls(
        &self,
        _request: GenerationRequest,
    ) -> Result<FunctionCallStream, TransportError> {
        Err(TransportError::Unavailable(self.reason.clone()))
    }
}

#[async_trait]
impl<T> GenerativeClient for Box<T>
where
    T: GenerativeClient + ?Sized,
{
    async fn stream_function_calls(
        &self,
        request: GenerationRequest,
    ) -> Result<FunctionCallStream, TransportError> {
        (**self).stream_function_calls(request).await
    }
}
