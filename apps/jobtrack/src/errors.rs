use thiserror::Error;

use crate::contract::{ResponseContractError, ValidationError};
use crate::session::storage::StorageError;

/// Client-level error type.
/// Views translate it into user-visible text via [`ClientError::user_message`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ResponseContract(#[from] ResponseContractError),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Credential storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "VALIDATION_ERROR",
            ClientError::ResponseContract(_) => "RESPONSE_CONTRACT_ERROR",
            ClientError::Authentication(_) => "AUTHENTICATION_ERROR",
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Api { status: 404, .. } => "NOT_FOUND",
            ClientError::Api { .. } => "API_ERROR",
            ClientError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, ClientError::Authentication(_))
    }

    /// Text a view shows to the user.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(e) => e
                .violations
                .iter()
                .map(|v| format!("{}: {}", v.field, v.reason))
                .collect::<Vec<_>>()
                .join("\n"),
            ClientError::ResponseContract(e) => {
                tracing::error!("Response contract violation: {e}");
                "The server sent an unexpected response. Please try again.".to_string()
            }
            ClientError::Authentication(_) => {
                "Your session is invalid or has expired. Please log in again.".to_string()
            }
            ClientError::Transport(e) => {
                tracing::error!("Transport error: {e}");
                "Could not reach the server. Please check your connection and try again."
                    .to_string()
            }
            ClientError::Api { status: 404, .. } => "The requested item was not found.".to_string(),
            ClientError::Api { status, message } if *status < 500 => message.clone(),
            ClientError::Api { status, message } => {
                tracing::error!("Server error {status}: {message}");
                "The server encountered an error. Please try again later.".to_string()
            }
            ClientError::Storage(e) => {
                tracing::error!("Credential storage error: {e}");
                "Could not save your session on this device.".to_string()
            }
        }
    }
}
