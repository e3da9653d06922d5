use shared::{
    domain::QueryId,
    error::{ErrorCode, SurfacedError},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("generative client is unavailable: {0}")]
    Unavailable(String),
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("model API returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("model API reported an error: {0}")]
    Remote(String),
    #[error("malformed stream payload: {0}")]
    Decode(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("could not generate any results; try again or try a different query")]
    NoResults,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("mode can only be changed while no query is running")]
    ModeLocked,
    #[error("query {0} is no longer current")]
    StaleQuery(QueryId),
}

impl SessionError {
    /// The message to put in front of the user, if this error is user-visible.
    pub fn surfaced(&self) -> Option<SurfacedError> {
        let code = match self {
            SessionError::EmptyPrompt | SessionError::StaleQuery(_) => return None,
            SessionError::NoResults => ErrorCode::NoResults,
            SessionError::Transport(_) => ErrorCode::Transport,
            SessionError::ModeLocked => ErrorCode::ModeLocked,
        };
        Some(SurfacedError::new(code, self.to_string()))
    }
}
