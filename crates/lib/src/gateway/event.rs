//! Inbound request classification: LINE webhook payload or generic prompt request.

use crate::gateway::error::GatewayError;
use serde_json::Value;

/// Prompt used when a generic request carries none.
pub const DEFAULT_PROMPT: &str = "Hello";

/// A parsed request body, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Body had a non-empty `events` list. Events stay raw; decoding errors belong to webhook handling.
    Webhook { events: Vec<Value> },
    /// Anything else: a prompt for the agent runtime.
    Api { prompt: String },
}

/// Parse the raw body. Empty => `MissingBody`; not JSON => `MalformedRequest`.
pub fn parse_body(body: &[u8]) -> Result<Value, GatewayError> {
    if body.is_empty() {
        return Err(GatewayError::MissingBody);
    }
    serde_json::from_slice(body).map_err(GatewayError::MalformedRequest)
}

/// Classify a parsed body. A non-empty `events` list wins over `prompt`.
pub fn classify(body: Value) -> Result<InboundEvent, GatewayError> {
    let Value::Object(mut obj) = body else {
        return Err(GatewayError::Unhandled(
            "request body must be a JSON object".to_string(),
        ));
    };
    if let Some(Value::Array(events)) = obj.remove("events") {
        if !events.is_empty() {
            return Ok(InboundEvent::Webhook { events });
        }
    }
    Ok(InboundEvent::Api {
        prompt: prompt_or_default(obj.remove("prompt")),
    })
}

/// The `prompt` value as text: strings as-is, other JSON rendered, absent => `DEFAULT_PROMPT`.
pub fn prompt_or_default(prompt: Option<Value>) -> String {
    match prompt {
        None => DEFAULT_PROMPT.to_string(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_is_missing() {
        assert!(matches!(parse_body(b""), Err(GatewayError::MissingBody)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = parse_body(b"{not json").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedRequest(_)));
        assert_eq!(err.to_string(), "Invalid JSON in request body");
    }

    #[test]
    fn events_win_over_prompt() {
        let event = classify(json!({
            "prompt": "ignored",
            "events": [{ "type": "message" }]
        }))
        .unwrap();
        assert_eq!(
            event,
            InboundEvent::Webhook {
                events: vec![json!({ "type": "message" })]
            }
        );
    }

    #[test]
    fn empty_events_is_a_prompt_request() {
        let event = classify(json!({ "events": [], "prompt": "hi" })).unwrap();
        assert_eq!(
            event,
            InboundEvent::Api {
                prompt: "hi".to_string()
            }
        );
    }

    #[test]
    fn prompt_defaults_to_hello() {
        assert_eq!(
            classify(json!({})).unwrap(),
            InboundEvent::Api {
                prompt: "Hello".to_string()
            }
        );
    }

    #[test]
    fn non_string_prompt_is_rendered() {
        assert_eq!(
            classify(json!({ "prompt": 42 })).unwrap(),
            InboundEvent::Api {
                prompt: "42".to_string()
            }
        );
    }

    #[test]
    fn non_object_body_is_unhandled() {
        let err = classify(json!(["a"])).unwrap_err();
        assert!(matches!(err, GatewayError::Unhandled(_)));
    }
}
