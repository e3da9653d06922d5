//! Generative client that replays a fixed script instead of calling a model.

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use shared::protocol::FunctionCall;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    error::TransportError,
    generative::{FunctionCallStream, GenerationRequest, GenerativeClient},
};

/// One line of a replay script: either a call or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScriptedEvent {
    Call(FunctionCall),
    Fail { error: String },
}

#[derive(Clone, Default)]
pub struct ScriptedClient {
    events: Vec<ScriptedEvent>,
    refusal: Option<String>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl ScriptedClient {
    pub fn new(calls: impl IntoIterator<Item = FunctionCall>) -> Self {
        Self::from_events(calls.into_iter().map(ScriptedEvent::Call).collect())
    }

    pub fn from_events(events: Vec<ScriptedEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    /// Streams `calls`, then fails with `message`.
    pub fn failing_after(
        calls: impl IntoIterator<Item = FunctionCall>,
        message: impl Into<String>,
    ) -> Self {
        let mut events: Vec<ScriptedEvent> = calls.into_iter().map(ScriptedEvent::Call).collect();
        events.push(ScriptedEvent::Fail {
            error: message.into(),
        });
        Self::from_events(events)
    }

    /// Refuses every request before any stream starts.
    pub fn rejecting(message: impl Into<String>) -> Self {
        Self {
            refusal: Some(message.into()),
            ..Self::default()
        }
    }

    /// Parses one event per non-blank line; `#` lines are comments.
    pub fn from_json_lines(script: &str) -> Result<Self, TransportError> {
        let mut events = Vec::new();
        for (number, line) in script.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let event = serde_json::from_str(line)
                .map_err(|err| TransportError::Decode(format!("line {}: {err}", number + 1)))?;
            events.push(event);
        }
        Ok(Self::from_events(events))
    }

    pub async fn from_file(path: &Path) -> Result<Self, TransportError> {
        let script = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| TransportError::Other(format!("{}: {err}", path.display())))?;
        Self::from_json_lines(&script)
    }

    pub fn events(&self) -> &[ScriptedEvent] {
        &self.events
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl GenerativeClient for ScriptedClient {
    async fn stream_function_calls(
        &self,
        request: GenerationRequest,
    ) -> Result<FunctionCallStream, TransportError> {
        self.requests.lock().await.push(request);
        if let Some(reason) = &self.refusal {
            return Err(TransportError::Other(reason.clone()));
        }

        let mut items = Vec::with_capacity(self.events.len());
        for event in &self.events {
            match event {
                ScriptedEvent::Call(call) => items.push(Ok(call.clone())),
                ScriptedEvent::Fail { error } => {
                    items.push(Err(TransportError::Remote(error.clone())));
                    break;
                }
            }
        }
        debug!(events = items.len(), "replaying scripted response");
        Ok(tokio_stream::iter(items).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::domain::AppMode;

    #[test]
    fn json_lines_accept_calls_errors_and_comments() {
        let script = r#"
# opening stop
{"name": "location", "args": {"name": "Louvre", "description": "d", "lat": "48.86", "lng": "2.33"}}

{"error": "model went away"}
"#;
        let client = ScriptedClient::from_json_lines(script).expect("script");

        assert_eq!(client.events().len(), 2);
        assert!(matches!(&client.events()[0], ScriptedEvent::Call(call) if call.name == "location"));
        assert_eq!(
            client.events()[1],
            ScriptedEvent::Fail {
                error: "model went away".to_string()
            }
        );
    }

    #[test]
    fn bad_line_reports_its_number() {
        let err = ScriptedClient::from_json_lines("{\"name\": \"line\"}\nnot json")
            .err()
            .expect("parse failure");
        assert!(matches!(err, TransportError::Decode(message) if message.starts_with("line 2:")));
    }

    #[tokio::test]
    async fn stream_stops_at_first_failure_and_records_request() {
        let client = ScriptedClient::failing_after(
            [FunctionCall::new("location", json!({}))],
            "boom",
        );

        let items: Vec<_> = client
            .stream_function_calls(GenerationRequest::for_query("parks", AppMode::Explorer, 1.0))
            .await
            .expect("stream")
            .collect()
            .await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(&items[1], Err(TransportError::Remote(message)) if message == "boom"));
        assert_eq!(client.requests().await[0].prompt, "parks");
    }

    #[tokio::test]
    async fn rejecting_client_fails_before_streaming() {
        let client = ScriptedClient::rejecting("offline");
        let result = client
            .stream_function_calls(GenerationRequest::for_query("x", AppMode::Planner, 1.0))
            .await;
        assert!(matches!(result, Err(TransportError::Other(message)) if message == "offline"));
        assert_eq!(client.requests().await.len(), 1);
    }
}
