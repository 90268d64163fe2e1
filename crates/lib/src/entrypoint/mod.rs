//! Local agent entrypoint.
//!
//! Serves a hosted model behind the agent runtime container contract so it can be deployed
//! as the runtime the gateway invokes. Each invocation is a single model call.

mod agent;
mod server;

pub use agent::{Agent, AgentError, AgentMessage, BedrockAgent, MessageContent};
pub use server::{invoke, router, run_entrypoint, EntrypointError, EntrypointState};
