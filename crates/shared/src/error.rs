use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NoResults,
    Transport,
    ModeLocked,
}

/// Error as shown to the user next to the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfacedError {
    pub code: ErrorCode,
    pub message: String,
}

impl SurfacedError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolCallError {
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("invalid arguments for `{function}`: {source}")]
    InvalidArguments {
        function: String,
        #[source]
        source: serde_json::Error,
    },
}

