//! Communication channels (LINE).
//!
//! Webhook payload types for inbound events and a reply client for answering them.
//! The gateway talks to the reply side through `ReplySender` so tests can substitute it.

mod line;
mod reply;

pub use line::{LineChannel, LineError, LineEvent, LineMessage};
pub use reply::{dispatch_reply, ReplyOutcome, ReplySender};
