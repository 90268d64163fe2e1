//! Reply dispatch: deliver one text answer to the sender of a webhook event.

use async_trait::async_trait;

/// Sends a text reply addressed by a platform reply token.
#[async_trait]
pub trait ReplySender: Send + Sync {
    /// Channel id (e.g. "line").
    fn id(&self) -> &str;
    async fn reply(&self, reply_token: &str, text: &str) -> Result<(), String>;
}

/// What happened to a reply. Delivery problems never fail the webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Sent,
    /// No reply sender configured (missing access token at startup).
    Skipped,
    Failed(String),
}

/// Send exactly one reply. A missing sender is logged here; failures are returned for the caller to record.
pub async fn dispatch_reply(
    sender: Option<&dyn ReplySender>,
    reply_token: &str,
    text: &str,
) -> ReplyOutcome {
    let Some(sender) = sender else {
        log::error!("reply channel not configured, dropping reply");
        return ReplyOutcome::Skipped;
    };
    log::debug!("{}: sending reply: {}", sender.id(), text);
    match sender.reply(reply_token, text).await {
        Ok(()) => {
            log::debug!("{}: reply sent", sender.id());
            ReplyOutcome::Sent
        }
        Err(e) => ReplyOutcome::Failed(e),
    }
}
