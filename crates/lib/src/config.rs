//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.agentline/config.json`) and environment.
//! The resolved value is built once at startup and handed to the servers; nothing here is global.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_LINE_API_BASE: &str = "https://api.line.me";
const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-sonnet-4-20250514-v1:0";
const DEFAULT_MODEL_REGION: &str = "us-east-1";
const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Webhook gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Local agent entrypoint server settings.
    #[serde(default)]
    pub entrypoint: EntrypointConfig,

    /// Channel settings (LINE).
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Agent runtime and model settings.
    #[serde(default)]
    pub agents: AgentsConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for the webhook/API endpoint (default 15151).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    15151
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Entrypoint bind and port. The agent runtime container contract expects 0.0.0.0:8080.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrypointConfig {
    #[serde(default = "default_entrypoint_port")]
    pub port: u16,

    #[serde(default = "default_entrypoint_bind")]
    pub bind: String,
}

fn default_entrypoint_port() -> u16 {
    8080
}

fn default_entrypoint_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for EntrypointConfig {
    fn default() -> Self {
        Self {
            port: default_entrypoint_port(),
            bind: default_entrypoint_bind(),
        }
    }
}

/// Per-channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    #[serde(default)]
    pub line: LineChannelConfig,
}

/// LINE Messaging API config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChannelConfig {
    /// Channel access token. Overridden by LINE_CHANNEL_ACCESS_TOKEN env when set.
    pub channel_access_token: Option<String>,
    /// Messaging API base URL (default https://api.line.me). Overridden by LINE_API_BASE env.
    pub api_base: Option<String>,
}

/// Agent runtime (webhook gateway) and hosted model (local entrypoint) settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentsConfig {
    /// ARN of the agent runtime invoked by the gateway. Overridden by BEDROCK_AGENT_RUNTIME_ARN env.
    pub runtime_arn: Option<String>,
    /// Region for the agent runtime client. When absent the AWS default provider chain decides.
    pub region: Option<String>,
    /// Model id for the local entrypoint (default us.anthropic.claude-sonnet-4-20250514-v1:0).
    pub model_id: Option<String>,
    /// Region for the local entrypoint model (default us-east-1).
    pub model_region: Option<String>,
    /// System prompt for the local entrypoint model.
    pub system_prompt: Option<String>,
}

/// Non-empty, trimmed value of an environment variable.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

/// Non-empty, trimmed value from the config file.
fn config_value(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Resolve the LINE channel access token: env LINE_CHANNEL_ACCESS_TOKEN overrides config.
pub fn resolve_line_token(config: &Config) -> Option<String> {
    env_value("LINE_CHANNEL_ACCESS_TOKEN")
        .or_else(|| config_value(config.channels.line.channel_access_token.as_ref()))
}

/// Resolve the LINE Messaging API base URL: env LINE_API_BASE overrides config.
pub fn resolve_line_api_base(config: &Config) -> String {
    env_value("LINE_API_BASE")
        .or_else(|| config_value(config.channels.line.api_base.as_ref()))
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_LINE_API_BASE.to_string())
}

/// Resolve the agent runtime ARN: env BEDROCK_AGENT_RUNTIME_ARN overrides config.
pub fn resolve_runtime_arn(config: &Config) -> Option<String> {
    env_value("BEDROCK_AGENT_RUNTIME_ARN")
        .or_else(|| config_value(config.agents.runtime_arn.as_ref()))
}

pub fn resolve_model_id(agents: &AgentsConfig) -> String {
    config_value(agents.model_id.as_ref()).unwrap_or_else(|| DEFAULT_MODEL_ID.to_string())
}

pub fn resolve_model_region(agents: &AgentsConfig) -> String {
    config_value(agents.model_region.as_ref()).unwrap_or_else(|| DEFAULT_MODEL_REGION.to_string())
}

pub fn resolve_system_prompt(agents: &AgentsConfig) -> String {
    config_value(agents.system_prompt.as_ref())
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("AGENTLINE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".agentline").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, AGENTLINE_CONFIG_PATH, or the default. Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
