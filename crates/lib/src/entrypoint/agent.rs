//! Hosted model agent: one Bedrock Converse call per prompt, under a fixed system prompt.

use crate::config::{self, AgentsConfig};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, ConverseOutput, Message, SystemContentBlock,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("model request failed: {0}")]
    Request(String),
    #[error("model returned no message")]
    EmptyResponse,
}

/// Assistant message in the shape callers unwrap: `{"role": ..., "content": [{"text": ...}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub role: String,
    pub content: Vec<MessageContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageContent {
    pub text: String,
}

impl AgentMessage {
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: vec![MessageContent { text: text.into() }],
        }
    }
}

/// Answers a prompt with one assistant message.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn respond(&self, prompt: &str) -> Result<AgentMessage, AgentError>;
}

/// Agent backed by a Bedrock model through the Converse API.
#[derive(Clone)]
pub struct BedrockAgent {
    model_id: String,
    system_prompt: String,
    client: aws_sdk_bedrockruntime::Client,
}

impl BedrockAgent {
    pub fn new(
        model_id: String,
        system_prompt: String,
        client: aws_sdk_bedrockruntime::Client,
    ) -> Self {
        Self {
            model_id,
            system_prompt,
            client,
        }
    }

    /// Build from `agents.modelId`, `agents.modelRegion` and `agents.systemPrompt` (with defaults).
    pub async fn from_config(agents: &AgentsConfig) -> Self {
        let region = config::resolve_model_region(agents);
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region))
            .load()
            .await;
        Self::new(
            config::resolve_model_id(agents),
            config::resolve_system_prompt(agents),
            aws_sdk_bedrockruntime::Client::new(&sdk_config),
        )
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl Agent for BedrockAgent {
    async fn respond(&self, prompt: &str) -> Result<AgentMessage, AgentError> {
        log::info!("agent: using model {}", self.model_id);
        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(prompt.to_string()))
            .build()
            .map_err(|e| AgentError::Request(e.to_string()))?;
        let output = self
            .client
            .converse()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(self.system_prompt.clone()))
            .messages(message)
            .send()
            .await
            .map_err(|e| AgentError::Request(DisplayErrorContext(&e).to_string()))?;
        log::debug!("agent: stop reason {:?}", output.stop_reason());

        let Some(ConverseOutput::Message(reply)) = output.output else {
            return Err(AgentError::EmptyResponse);
        };
        // Non-text blocks (tool use, reasoning) are not part of the reply.
        let content = reply
            .content()
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text(text) => Some(MessageContent { text: text.clone() }),
                _ => None,
            })
            .collect();
        Ok(AgentMessage {
            role: reply.role().as_str().to_string(),
            content,
        })
    }
}
