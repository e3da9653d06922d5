//! Streaming `generateContent` client for the Gemini REST API.

use async_trait::async_trait;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::{
    future,
    stream::{self, Stream},
    StreamExt,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::protocol::{FunctionCall, FunctionDeclaration};
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::TransportError,
    generative::{FunctionCallStream, GenerationRequest, GenerativeClient},
};

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, TransportError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TransportError::Unavailable(
                "no API key configured".to_string(),
            ));
        }
        let model = model.into();
        let endpoint = streaming_endpoint(base_url, &model)?;
        Ok(Self {
            http: Client::new(),
            endpoint,
            api_key,
            model,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn streaming_endpoint(base_url: &str, model: &str) -> Result<Url, TransportError> {
    let invalid = |err: url::ParseError| TransportError::InvalidEndpoint(format!("{base_url}: {err}"));
    let mut base = Url::parse(base_url).map_err(invalid)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    let mut endpoint = base
        .join(&format!("v1beta/models/{model}:streamGenerateContent"))
        .map_err(invalid)?;
    endpoint.query_pairs_mut().append_pair("alt", "sse");
    Ok(endpoint)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    generation_config: GenerationConfig,
    tools: Vec<ToolSet<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSet<'a> {
    function_declarations: &'a [FunctionDeclaration],
}

impl<'a> GenerateContentBody<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![TextPart {
                    text: &request.prompt,
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![TextPart {
                    text: &request.system_instructions,
                }],
            },
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
            tools: vec![ToolSet {
                function_declarations: &request.tools,
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

/// Extracts the function calls carried by one SSE `data:` payload.
pub fn decode_payload(data: &str) -> Result<Vec<FunctionCall>, TransportError> {
    let chunk: StreamChunk =
        serde_json::from_str(data).map_err(|err| TransportError::Decode(err.to_string()))?;
    if let Some(error) = chunk.error {
        return Err(TransportError::Remote(error.message));
    }
    Ok(chunk
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| part.function_call)
        .collect())
}

/// Turns a `text/event-stream` body into the function calls its events
/// carry. The stream ends after the first transport, framing or payload error.
fn function_calls<S, B>(bytes: S) -> FunctionCallStream
where
    S: Stream<Item = Result<B, TransportError>> + Send + 'static,
    B: AsRef<[u8]>,
{
    bytes
        .eventsource()
        .flat_map(|event| {
            let items: Vec<Result<FunctionCall, TransportError>> = match event {
                Ok(event) if event.data.trim().is_empty() => Vec::new(),
                Ok(event) => match decode_payload(&event.data) {
                    Ok(calls) => calls.into_iter().map(Ok).collect(),
                    Err(err) => vec![Err(err)],
                },
                Err(EventStreamError::Transport(err)) => vec![Err(err)],
                Err(err) => vec![Err(TransportError::Decode(err.to_string()))],
            };
            stream::iter(items)
        })
        .scan(false, |failed, item| {
            if *failed {
                return future::ready(None);
            }
            *failed = item.is_err();
            future::ready(Some(item))
        })
        .boxed()
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn stream_function_calls(
        &self,
        request: GenerationRequest,
    ) -> Result<FunctionCallStream, TransportError> {
        let body = GenerateContentBody::from_request(&request);
        debug!(model = %self.model, temperature = request.temperature, "starting generation");
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| text.trim().to_string());
            warn!(status = status.as_u16(), %message, "generation request failed");
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(TransportError::Request));
        Ok(function_calls(bytes))
    }
}

#[cfg(test)]
#[path = "tests/gemini_tests.rs"]
mod tests;
