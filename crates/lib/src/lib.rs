//! agentline core library — LINE webhook gateway, agent runtime client and response
//! normalization, and the local agent entrypoint, used by the CLI.

pub mod channels;
pub mod config;
pub mod entrypoint;
pub mod gateway;
pub mod runtime;
