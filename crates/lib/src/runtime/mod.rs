//! Agent runtime invocation.
//!
//! `AgentRuntime` is the seam the gateway calls through; `AgentCoreRuntime` is the
//! hosted implementation. Responses come back as a `BackendResponse` and are reduced
//! to plain text by the normalizer.

mod agentcore;
mod normalize;

pub use agentcore::AgentCoreRuntime;
pub use normalize::{
    extract_text, normalize, normalize_response, MissingLink, NormalizeError, WorkingResult,
};

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// No runtime ARN configured. Not fatal: its message stands in for the answer.
    #[error("Agent runtime ARN not configured")]
    NotConfigured,
    #[error("agent runtime request failed: {0}")]
    Request(String),
    #[error("agent runtime response stream failed: {0}")]
    Stream(String),
}

/// Raw result of one runtime invocation: the declared content type and the body as received, chunk by chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    pub content_type: String,
    pub status_code: Option<i32>,
    pub chunks: Vec<Bytes>,
}

impl BackendResponse {
    pub fn new(content_type: impl Into<String>, chunks: Vec<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            status_code: None,
            chunks,
        }
    }

    /// Total body length in bytes.
    pub fn body_len(&self) -> usize {
        self.chunks.iter().map(|c| c.len()).sum()
    }
}

/// Renders as a JSON object with the body as (lossy) text, so the value can be sent as a reply verbatim.
impl fmt::Display for BackendResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body: String = self
            .chunks
            .iter()
            .map(|c| String::from_utf8_lossy(c))
            .collect();
        let rendered = serde_json::json!({
            "contentType": self.content_type,
            "statusCode": self.status_code,
            "response": body,
        });
        write!(f, "{}", rendered)
    }
}

/// Invokes a hosted agent with a prompt.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<BackendResponse, RuntimeError>;
}

/// Fresh trace id for one invocation: random UUID as lowercase hex without separators.
pub fn new_trace_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Payload sent to the runtime: `{"prompt": <text>}`.
pub fn prompt_payload(prompt: &str) -> Vec<u8> {
    serde_json::json!({ "prompt": prompt }).to_string().into_bytes()
}

/// Error from `call_agent_runtime`: the invocation itself failed, or its JSON body did not parse.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Invoke the runtime and reduce its response to text.
/// With no runtime configured this returns the `RuntimeError::NotConfigured` message without calling anything.
pub async fn call_agent_runtime(
    runtime: Option<&dyn AgentRuntime>,
    prompt: &str,
) -> Result<String, InvokeError> {
    let Some(runtime) = runtime else {
        log::warn!("agent runtime not configured, returning placeholder result");
        return Ok(RuntimeError::NotConfigured.to_string());
    };
    log::debug!("agent runtime prompt: {}", prompt);
    let response = runtime.invoke(prompt).await?;
    log::debug!(
        "agent runtime response: contentType={} statusCode={:?} chunks={} bytes={}",
        response.content_type,
        response.status_code,
        response.chunks.len(),
        response.body_len()
    );
    Ok(normalize_response(&response)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedRuntime(BackendResponse);

    #[async_trait]
    impl AgentRuntime for CannedRuntime {
        async fn invoke(&self, _prompt: &str) -> Result<BackendResponse, RuntimeError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn trace_id_is_lowercase_hex_without_separators() {
        let id = new_trace_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(id, new_trace_id());
    }

    #[test]
    fn prompt_payload_is_json_object() {
        let payload: serde_json::Value =
            serde_json::from_slice(&prompt_payload("hi \"there\"")).unwrap();
        assert_eq!(payload, serde_json::json!({ "prompt": "hi \"there\"" }));
    }

    #[tokio::test]
    async fn unconfigured_runtime_returns_placeholder() {
        let text = call_agent_runtime(None, "hello").await.unwrap();
        assert_eq!(text, "Agent runtime ARN not configured");
    }

    #[tokio::test]
    async fn configured_runtime_is_normalized() {
        let runtime = CannedRuntime(BackendResponse::new(
            JSON_CONTENT_TYPE,
            vec![Bytes::from_static(br#"{"result":{"content":[{"text":"T"}]}}"#)],
        ));
        let text = call_agent_runtime(Some(&runtime), "hello").await.unwrap();
        assert_eq!(text, "T");
    }

    #[tokio::test]
    async fn malformed_json_body_is_an_error() {
        let runtime = CannedRuntime(BackendResponse::new(
            JSON_CONTENT_TYPE,
            vec![Bytes::from_static(b"{\"result\":")],
        ));
        let err = call_agent_runtime(Some(&runtime), "hello").await.unwrap_err();
        assert!(matches!(err, InvokeError::Normalize(_)));
    }

    #[test]
    fn display_renders_body_as_text() {
        let response = BackendResponse::new(
            "text/plain",
            vec![Bytes::from_static(b"ab"), Bytes::from_static(b"c")],
        );
        assert_eq!(
            response.to_string(),
            r#"{"contentType":"text/plain","statusCode":null,"response":"abc"}"#
        );
    }
}
