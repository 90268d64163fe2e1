//! Gateway HTTP server: LINE webhooks and generic prompt requests on one endpoint.

use crate::channels::{dispatch_reply, LineChannel, LineEvent, ReplyOutcome, ReplySender};
use crate::config::{self, Config};
use crate::gateway::error::GatewayError;
use crate::gateway::event::{self, InboundEvent};
use crate::runtime::{call_agent_runtime, AgentCoreRuntime, AgentRuntime};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Body returned to the platform for every webhook, whatever happened downstream.
const WEBHOOK_ACK: &str = "Success!";

/// Shared state for the gateway. Built once at startup; read-only afterwards.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    /// None when no runtime ARN is configured; requests then get the not-configured placeholder.
    pub runtime: Option<Arc<dyn AgentRuntime>>,
    /// None when no LINE access token is configured; replies are then skipped.
    pub replier: Option<Arc<dyn ReplySender>>,
}

impl GatewayState {
    /// Build the runtime client and LINE channel from config and environment.
    pub async fn from_config(config: Config) -> Self {
        let runtime: Option<Arc<dyn AgentRuntime>> = match config::resolve_runtime_arn(&config) {
            Some(arn) => {
                log::info!("agent runtime: {}", arn);
                let region = config.agents.region.clone();
                Some(Arc::new(AgentCoreRuntime::from_env(arn, region).await))
            }
            None => {
                log::warn!("agent runtime ARN not configured (set agents.runtimeArn or BEDROCK_AGENT_RUNTIME_ARN)");
                None
            }
        };
        let replier: Option<Arc<dyn ReplySender>> = match config::resolve_line_token(&config) {
            Some(token) => {
                let api_base = config::resolve_line_api_base(&config);
                log::info!("line channel registered: {}", api_base);
                Some(Arc::new(LineChannel::new(token, api_base)))
            }
            None => {
                log::error!("line channel access token not configured (set LINE_CHANNEL_ACCESS_TOKEN)");
                None
            }
        };
        Self {
            config: Arc::new(config),
            runtime,
            replier,
        }
    }
}

/// HTTP envelope for one handled request: JSON body, JSON content type, permissive CORS.
#[derive(Debug, Clone, PartialEq)]
pub struct EventResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl EventResponse {
    fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    fn webhook_ack() -> Self {
        Self::ok(Value::String(WEBHOOK_ACK.to_string()))
    }

    fn from_error(err: &GatewayError) -> Self {
        Self {
            status: err.status(),
            body: json!({ "error": err.to_string() }),
        }
    }
}

impl IntoResponse for EventResponse {
    fn into_response(self) -> Response {
        let mut res = (self.status, Json(self.body)).into_response();
        res.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        res
    }
}

/// Handle one request body end to end. Never fails: errors become status + `{"error": ...}`.
pub async fn handle_request(state: &GatewayState, body: &[u8]) -> EventResponse {
    match route_request(state, body).await {
        Ok(res) => res,
        Err(e) => {
            log::warn!("request failed: {}", e);
            EventResponse::from_error(&e)
        }
    }
}

async fn route_request(state: &GatewayState, body: &[u8]) -> Result<EventResponse, GatewayError> {
    let body = event::parse_body(body)?;
    match event::classify(body)? {
        InboundEvent::Webhook { events } => {
            if let Err(e) = handle_webhook(state, events).await {
                log::error!("line webhook processing failed: {}", e);
            }
            Ok(EventResponse::webhook_ack())
        }
        InboundEvent::Api { prompt } => {
            let result = call_agent_runtime(state.runtime.as_deref(), &prompt).await?;
            Ok(EventResponse::ok(json!({ "result": result })))
        }
    }
}

/// Answer the first webhook event when it is a text message. Other events are ignored.
async fn handle_webhook(state: &GatewayState, events: Vec<Value>) -> Result<(), GatewayError> {
    let Some(first) = events.into_iter().next() else {
        return Ok(());
    };
    let event: LineEvent = serde_json::from_value(first)
        .map_err(|e| GatewayError::Unhandled(format!("invalid webhook event: {}", e)))?;
    let Some(text) = event.text_message() else {
        log::debug!("ignoring webhook event of type {}", event.event_type);
        return Ok(());
    };
    let result = call_agent_runtime(state.runtime.as_deref(), text).await?;
    let reply_token = event
        .reply_token
        .as_deref()
        .ok_or_else(|| GatewayError::Unhandled("webhook event has no replyToken".to_string()))?;
    match dispatch_reply(state.replier.as_deref(), reply_token, &result).await {
        ReplyOutcome::Failed(e) => Err(GatewayError::DeliveryFailure(e)),
        ReplyOutcome::Sent | ReplyOutcome::Skipped => Ok(()),
    }
}

/// Routes: `GET /` health, `POST /` and `POST /webhook` events.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http).post(event_http))
        .route("/webhook", post(event_http))
        .with_state(state)
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let state = GatewayState::from_config(config).await;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes on SIGINT or SIGTERM.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// POST / and /webhook — LINE webhook or `{"prompt": ...}`.
async fn event_http(State(state): State<GatewayState>, body: Bytes) -> EventResponse {
    handle_request(&state, &body).await
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
    }))
}
