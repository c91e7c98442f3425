use thiserror::Error;

use crate::protocol::Operation;

/// Expiry markers as the backend phrases them ("Token expiré",
/// "Jeton invalide ou expiré", "token expired").
const EXPIRY_MARKERS: &[&str] = &["expired", "expiré"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Endpoint unreachable, transport failure, or a payload of the wrong shape.
    #[error("{0}")]
    ConnectionFailure(String),
    /// Credentials rejected, or a protected call attempted without a token.
    #[error("{0}")]
    AuthenticationFailure(String),
    #[error("session expired")]
    SessionExpired,
}

impl GatewayError {
    pub fn missing_token() -> Self {
        Self::AuthenticationFailure("not authenticated: session token missing".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    SessionExpired,
    Other,
}

pub fn failure_kind(text: &str) -> FailureKind {
    let lower = text.to_lowercase();
    if EXPIRY_MARKERS.iter().any(|marker| lower.contains(marker)) {
        FailureKind::SessionExpired
    } else {
        FailureKind::Other
    }
}

/// Maps any failure surfaced by a remote call onto the gateway taxonomy.
pub fn classify(operation: Operation, err: anyhow::Error) -> GatewayError {
    let err = match err.downcast::<GatewayError>() {
        Ok(GatewayError::AuthenticationFailure(message)) => {
            return GatewayError::AuthenticationFailure(message)
        }
        Ok(GatewayError::SessionExpired) => return GatewayError::SessionExpired,
        Ok(GatewayError::ConnectionFailure(message)) => {
            return match failure_kind(&message) {
                FailureKind::SessionExpired => GatewayError::SessionExpired,
                FailureKind::Other => GatewayError::ConnectionFailure(message),
            };
        }
        Err(err) => err,
    };

    let text = format!("{err:#}");
    match failure_kind(&text) {
        FailureKind::SessionExpired => {
            tracing::warn!(operation = operation.wire_name(), "backend reported an expired session");
            GatewayError::SessionExpired
        }
        FailureKind::Other => {
            tracing::warn!(operation = operation.wire_name(), error = %text, "remote call failed");
            GatewayError::ConnectionFailure(format!("error while {}: {text}", operation.describe()))
        }
    }
}
