//! Gateway error taxonomy and its HTTP status mapping.

use crate::runtime::{InvokeError, NormalizeError};
use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Missing request body")]
    MissingBody,
    #[error("Invalid JSON in request body")]
    MalformedRequest(#[source] serde_json::Error),
    #[error("{0}")]
    ResponseParseFailure(#[from] NormalizeError),
    /// Reply could not be delivered; recorded, never surfaced to the platform.
    #[error("failed to send reply: {0}")]
    DeliveryFailure(String),
    #[error("{0}")]
    Unhandled(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingBody | GatewayError::MalformedRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::ResponseParseFailure(_)
            | GatewayError::DeliveryFailure(_)
            | GatewayError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InvokeError> for GatewayError {
    fn from(e: InvokeError) -> Self {
        match e {
            InvokeError::Normalize(e) => GatewayError::ResponseParseFailure(e),
            InvokeError::Runtime(e) => GatewayError::Unhandled(e.to_string()),
        }
    }
}
