//! Entrypoint HTTP server: the agent runtime container contract (`POST /invocations`, `GET /ping`).

use crate::config::Config;
use crate::entrypoint::agent::{Agent, AgentError, BedrockAgent};
use crate::gateway::{prompt_or_default, shutdown_signal};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum EntrypointError {
    #[error("Invalid JSON in request body")]
    MalformedRequest(#[source] serde_json::Error),
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl EntrypointError {
    pub fn status(&self) -> StatusCode {
        match self {
            EntrypointError::MalformedRequest(_) | EntrypointError::NotAnObject => {
                StatusCode::BAD_REQUEST
            }
            EntrypointError::Agent(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for EntrypointError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Clone)]
pub struct EntrypointState {
    pub agent: Arc<dyn Agent>,
}

/// Handle one invocation payload: `{"prompt": ...}` in, `{"result": <agent message>}` out.
pub async fn invoke(state: &EntrypointState, body: &[u8]) -> Result<Value, EntrypointError> {
    let payload: Value = serde_json::from_slice(body).map_err(EntrypointError::MalformedRequest)?;
    let Value::Object(mut payload) = payload else {
        return Err(EntrypointError::NotAnObject);
    };
    let prompt = prompt_or_default(payload.remove("prompt"));
    let message = state.agent.respond(&prompt).await?;
    Ok(json!({ "result": message }))
}

pub fn router(state: EntrypointState) -> Router {
    Router::new()
        .route("/invocations", post(invocations_http))
        .route("/ping", get(ping_http))
        .with_state(state)
}

/// Run the entrypoint server; binds to config.entrypoint.bind:config.entrypoint.port.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_entrypoint(config: Config) -> Result<()> {
    let agent = BedrockAgent::from_config(&config.agents).await;
    log::info!("entrypoint model: {}", agent.model_id());
    let state = EntrypointState {
        agent: Arc::new(agent),
    };

    let bind_addr = format!("{}:{}", config.entrypoint.bind.trim(), config.entrypoint.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("entrypoint listening on {}", bind_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("entrypoint server exited")?;
    log::info!("entrypoint stopped");
    Ok(())
}

/// POST /invocations
async fn invocations_http(
    State(state): State<EntrypointState>,
    body: Bytes,
) -> Result<Json<Value>, EntrypointError> {
    match invoke(&state, &body).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            log::warn!("invocation failed: {}", e);
            Err(e)
        }
    }
}

/// GET /ping — health for the runtime host.
async fn ping_http() -> Json<Value> {
    Json(json!({
        "status": "Healthy",
        "time_of_last_update": chrono::Utc::now().timestamp(),
    }))
}
