//! Gateway: the webhook/API endpoint.
//!
//! One HTTP endpoint accepts both LINE webhook payloads and `{"prompt": ...}` requests.
//! Prompts go to the agent runtime; webhook text messages are answered through the reply channel.

mod error;
mod event;
mod server;

pub use error::GatewayError;
pub use event::{classify, parse_body, prompt_or_default, InboundEvent, DEFAULT_PROMPT};
pub use server::{handle_request, router, run_gateway, EventResponse, GatewayState};
pub(crate) use server::shutdown_signal;
