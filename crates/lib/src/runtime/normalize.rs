//! Response normalization: reduce a runtime response of any shape to one display string.
//!
//! The body is first decoded according to its content type into a `WorkingResult`,
//! then `result.content[0].text` is looked up. When any link of that chain is missing,
//! the whole working result is rendered instead, not the deepest value reached.

use super::{BackendResponse, EVENT_STREAM_CONTENT_TYPE, JSON_CONTENT_TYPE};
use serde_json::Value;
use std::fmt;

const DATA_PREFIX: &str = "data: ";

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("invalid JSON in agent runtime response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decoded body before text extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkingResult {
    /// Parsed JSON (application/json body, or event-stream data that parsed).
    Json(Value),
    /// Event-stream data lines that were not valid JSON, joined with newlines.
    Text(String),
    /// Any other content type: the response itself.
    Raw(BackendResponse),
}

impl fmt::Display for WorkingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkingResult::Json(Value::String(s)) => f.write_str(s),
            WorkingResult::Json(v) => write!(f, "{}", v),
            WorkingResult::Text(s) => f.write_str(s),
            WorkingResult::Raw(r) => write!(f, "{}", r),
        }
    }
}

/// First link of `result.content[0].text` that was absent or had the wrong shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingLink {
    Result,
    Content,
    FirstItem,
    Text,
}

impl fmt::Display for MissingLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MissingLink::Result => "working result is not an object with a 'result' key",
            MissingLink::Content => "'result' is not an object with a 'content' key",
            MissingLink::FirstItem => "'content' is not a non-empty list",
            MissingLink::Text => "first content item is not an object with a string 'text'",
        };
        f.write_str(s)
    }
}

/// Decode the response body according to its content type.
/// Event-stream data that is not JSON falls back to text; an application/json body that is not JSON is an error.
pub fn normalize(response: &BackendResponse) -> Result<WorkingResult, NormalizeError> {
    if response.content_type.contains(EVENT_STREAM_CONTENT_TYPE) {
        log::debug!("normalize: processing event-stream response");
        let data = event_stream_data(response);
        log::debug!("normalize: event-stream data: {}", data);
        return Ok(match serde_json::from_str::<Value>(&data) {
            Ok(parsed) => WorkingResult::Json(parsed),
            Err(e) => {
                log::debug!("normalize: event-stream data is not JSON ({}), keeping text", e);
                WorkingResult::Text(data)
            }
        });
    }
    if response.content_type == JSON_CONTENT_TYPE {
        log::debug!(
            "normalize: processing JSON response ({} chunk(s))",
            response.chunks.len()
        );
        let body: Vec<u8> = response.chunks.concat();
        let parsed: Value = serde_json::from_slice(&body)?;
        return Ok(WorkingResult::Json(parsed));
    }
    log::debug!(
        "normalize: content type {:?} passed through unparsed",
        response.content_type
    );
    Ok(WorkingResult::Raw(response.clone()))
}

/// Lines starting with "data: ", prefix stripped, joined with "\n". Chunk boundaries do not split lines.
fn event_stream_data(response: &BackendResponse) -> String {
    let body: Vec<u8> = response.chunks.concat();
    String::from_utf8_lossy(&body)
        .split(['\n', '\r'])
        .filter(|line| !line.is_empty())
        .filter_map(|line| line.strip_prefix(DATA_PREFIX))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Look up `result.content[0].text` in the working result.
pub fn extract_text(working: &WorkingResult) -> Result<&str, MissingLink> {
    let WorkingResult::Json(value) = working else {
        return Err(MissingLink::Result);
    };
    let result = value
        .as_object()
        .and_then(|o| o.get("result"))
        .ok_or(MissingLink::Result)?;
    let content = result
        .as_object()
        .and_then(|o| o.get("content"))
        .ok_or(MissingLink::Content)?;
    let first = content
        .as_array()
        .and_then(|items| items.first())
        .ok_or(MissingLink::FirstItem)?;
    first
        .as_object()
        .and_then(|o| o.get("text"))
        .and_then(Value::as_str)
        .ok_or(MissingLink::Text)
}

/// Full normalization: decode, extract the text, or render the whole working result.
pub fn normalize_response(response: &BackendResponse) -> Result<String, NormalizeError> {
    let working = normalize(response)?;
    match extract_text(&working) {
        Ok(text) => {
            log::debug!("normalize: extracted text: {}", text);
            Ok(text.to_string())
        }
        Err(link) => {
            // Renders the top-level working result even when part of the chain matched.
            let rendered = working.to_string();
            log::debug!("normalize: {}; falling back to string: {}", link, rendered);
            Ok(rendered)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn json_response(chunks: &[&'static str]) -> BackendResponse {
        BackendResponse::new(
            JSON_CONTENT_TYPE,
            chunks.iter().map(|c| Bytes::from_static(c.as_bytes())).collect(),
        )
    }

    fn event_stream(body: &'static str) -> BackendResponse {
        BackendResponse::new(
            "text/event-stream; charset=utf-8",
            vec![Bytes::from_static(body.as_bytes())],
        )
    }

    #[test]
    fn json_chunks_are_concatenated_before_parsing() {
        let response = json_response(&[r#"{"result":{"con"#, r#"tent":[{"text":"T"}]}}"#]);
        assert_eq!(normalize_response(&response).unwrap(), "T");
    }

    #[test]
    fn empty_content_falls_back_to_top_level_result() {
        let response = json_response(&[r#"{"result":{"content":[]}}"#]);
        assert_eq!(
            normalize_response(&response).unwrap(),
            r#"{"result":{"content":[]}}"#
        );
    }

    #[test]
    fn partial_match_renders_top_level_not_deepest_value() {
        let response = json_response(&[r#"{"result":{"content":[{"image":"x"}]},"extra":1}"#]);
        let working = normalize(&response).unwrap();
        assert_eq!(extract_text(&working), Err(MissingLink::Text));
        assert_eq!(
            normalize_response(&response).unwrap(),
            r#"{"result":{"content":[{"image":"x"}]},"extra":1}"#
        );
    }

    #[test]
    fn missing_links_are_reported_in_order() {
        let cases = [
            (r#"[1,2]"#, MissingLink::Result),
            (r#"{"other":1}"#, MissingLink::Result),
            (r#"{"result":"done"}"#, MissingLink::Content),
            (r#"{"result":{"content":{"text":"x"}}}"#, MissingLink::FirstItem),
            (r#"{"result":{"content":[{"text":5}]}}"#, MissingLink::Text),
        ];
        for (body, expected) in cases {
            let working = WorkingResult::Json(serde_json::from_str(body).unwrap());
            assert_eq!(extract_text(&working), Err(expected), "body {}", body);
        }
    }

    #[test]
    fn event_stream_data_line_is_parsed() {
        let response = event_stream("data: {\"result\":{\"content\":[{\"text\":\"hi\"}]}}\n\n");
        assert_eq!(normalize_response(&response).unwrap(), "hi");
    }

    #[test]
    fn event_stream_cr_only_line_endings() {
        let response = event_stream("data: first\rdata: second\r\r");
        assert_eq!(
            normalize(&response).unwrap(),
            WorkingResult::Text("first\nsecond".to_string())
        );
    }

    #[test]
    fn event_stream_lines_split_across_chunks() {
        let response = BackendResponse::new(
            EVENT_STREAM_CONTENT_TYPE,
            vec![
                Bytes::from_static(b"data: \"hel"),
                Bytes::from_static(b"lo\"\r\n\r\n"),
            ],
        );
        assert_eq!(
            normalize(&response).unwrap(),
            WorkingResult::Json(Value::String("hello".to_string()))
        );
        assert_eq!(normalize_response(&response).unwrap(), "hello");
    }

    #[test]
    fn event_stream_non_json_returns_joined_text() {
        let response = event_stream("data: first\n\nevent: ping\ndata: second\n\n");
        assert_eq!(
            normalize(&response).unwrap(),
            WorkingResult::Text("first\nsecond".to_string())
        );
        assert_eq!(normalize_response(&response).unwrap(), "first\nsecond");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let response = json_response(&["{\"result\": "]);
        assert!(matches!(
            normalize_response(&response),
            Err(NormalizeError::Json(_))
        ));
    }

    #[test]
    fn json_content_type_must_match_exactly() {
        let response = BackendResponse::new(
            "application/json; charset=utf-8",
            vec![Bytes::from_static(b"not json")],
        );
        let working = normalize(&response).unwrap();
        assert_eq!(working, WorkingResult::Raw(response.clone()));
        assert_eq!(normalize_response(&response).unwrap(), response.to_string());
    }

    #[test]
    fn normalizing_twice_gives_the_same_result() {
        let response = json_response(&[r#"{"result":{"content":[{"text":"same"}]}}"#]);
        let first = normalize_response(&response).unwrap();
        let second = normalize_response(&response).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            response,
            json_response(&[r#"{"result":{"content":[{"text":"same"}]}}"#])
        );
    }
}
