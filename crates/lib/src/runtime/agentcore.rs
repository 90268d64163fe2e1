//! Bedrock AgentCore runtime client: InvokeAgentRuntime with a JSON prompt payload.

use super::{
    new_trace_id, prompt_payload, AgentRuntime, BackendResponse, RuntimeError, JSON_CONTENT_TYPE,
};
use async_trait::async_trait;
use aws_sdk_bedrockagentcore::error::DisplayErrorContext;
use aws_sdk_bedrockagentcore::primitives::Blob;

/// Client for one agent runtime, addressed by ARN.
#[derive(Clone)]
pub struct AgentCoreRuntime {
    runtime_arn: String,
    client: aws_sdk_bedrockagentcore::Client,
}

impl AgentCoreRuntime {
    pub fn new(runtime_arn: String, client: aws_sdk_bedrockagentcore::Client) -> Self {
        Self {
            runtime_arn,
            client,
        }
    }

    /// Build a client from the AWS default provider chain; `region` overrides the chain's region.
    pub async fn from_env(runtime_arn: String, region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let sdk_config = loader.load().await;
        Self::new(runtime_arn, aws_sdk_bedrockagentcore::Client::new(&sdk_config))
    }
}

#[async_trait]
impl AgentRuntime for AgentCoreRuntime {
    async fn invoke(&self, prompt: &str) -> Result<BackendResponse, RuntimeError> {
        let payload = prompt_payload(prompt);
        let trace_id = new_trace_id();
        log::debug!(
            "invoking agent runtime {} (traceId {}), payload: {}",
            self.runtime_arn,
            trace_id,
            String::from_utf8_lossy(&payload)
        );
        let mut output = self
            .client
            .invoke_agent_runtime()
            .agent_runtime_arn(&self.runtime_arn)
            .content_type(JSON_CONTENT_TYPE)
            .payload(Blob::new(payload))
            .trace_id(trace_id)
            .send()
            .await
            .map_err(|e| RuntimeError::Request(DisplayErrorContext(&e).to_string()))?;

        let content_type = output.content_type().to_string();
        let status_code = output.status_code();
        let mut chunks = Vec::new();
        while let Some(chunk) = output.response.next().await {
            let chunk = chunk.map_err(|e| RuntimeError::Stream(e.to_string()))?;
            chunks.push(chunk);
        }
        Ok(BackendResponse {
            content_type,
            status_code,
            chunks,
        })
    }
}
