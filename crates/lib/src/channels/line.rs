//! LINE channel: webhook event payloads and the Messaging API reply call.

use crate::channels::reply::ReplySender;
use async_trait::async_trait;
use serde::Deserialize;

/// One item of a LINE webhook's `events` list.
/// Only `type == "message"` with a text message is answered.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub message: Option<LineMessage>,
    #[serde(default)]
    pub reply_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl LineEvent {
    /// Text of a text-message event; None for any other event or message type.
    pub fn text_message(&self) -> Option<&str> {
        if self.event_type != "message" {
            return None;
        }
        let message = self.message.as_ref()?;
        if message.message_type != "text" {
            return None;
        }
        message.text.as_deref()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("line request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("line api error: {0}")]
    Api(String),
}

/// LINE Messaging API client holding the channel access token.
#[derive(Clone)]
pub struct LineChannel {
    id: String,
    token: String,
    api_base: String,
    client: reqwest::Client,
}

impl LineChannel {
    pub fn new(token: String, api_base: String) -> Self {
        Self {
            id: "line".to_string(),
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// POST /v2/bot/message/reply — answer one event with a single text message.
    pub async fn reply_text(&self, reply_token: &str, text: &str) -> Result<(), LineError> {
        let url = format!("{}/v2/bot/message/reply", self.api_base);
        let body = serde_json::json!({
            "replyToken": reply_token,
            "messages": [{ "type": "text", "text": text }],
        });
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LineError::Api(format!("{} {}", status, body)));
        }
        Ok(())
    }
}

#[async_trait]
impl ReplySender for LineChannel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn reply(&self, reply_token: &str, text: &str) -> Result<(), String> {
        self.reply_text(reply_token, text)
            .await
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_message_event() {
        let event: LineEvent = serde_json::from_str(
            r#"{
                "type": "message",
                "replyToken": "rt-1",
                "source": { "type": "user", "userId": "U1" },
                "message": { "id": "1", "type": "text", "text": "hello" }
            }"#,
        )
        .unwrap();
        assert_eq!(event.reply_token.as_deref(), Some("rt-1"));
        assert_eq!(event.text_message(), Some("hello"));
    }

    #[test]
    fn non_text_events_have_no_text_message() {
        let follow: LineEvent =
            serde_json::from_str(r#"{ "type": "follow", "replyToken": "rt" }"#).unwrap();
        assert_eq!(follow.text_message(), None);

        let sticker: LineEvent = serde_json::from_str(
            r#"{ "type": "message", "replyToken": "rt", "message": { "type": "sticker" } }"#,
        )
        .unwrap();
        assert_eq!(sticker.text_message(), None);
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let channel = LineChannel::new("t".to_string(), "http://127.0.0.1:9/".to_string());
        assert_eq!(channel.api_base, "http://127.0.0.1:9");
        assert_eq!(channel.id(), "line");
    }
}
