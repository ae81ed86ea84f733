//! # Error Types
//!
//! Typed error handling for the STK push client.
//! All gateway operations return `Result<T, MpesaError>`.

use thiserror::Error;

/// Core error type for all gateway operations
#[derive(Debug, Error)]
pub enum MpesaError {
    /// Configuration errors (missing credentials, invalid values)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Token endpoint unreachable or credentials rejected
    #[error("Token acquisition failed{}: {message}", status_suffix(.status))]
    TokenAcquisition {
        message: String,
        status: Option<u16>,
    },

    /// Payment endpoint unreachable or payload/auth rejected
    #[error("STK push submission failed{}: {message}", status_suffix(.status))]
    Submission {
        message: String,
        status: Option<u16>,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl MpesaError {
    /// Token failure caused by transport (no HTTP status)
    pub fn token_transport(message: impl Into<String>) -> Self {
        MpesaError::TokenAcquisition {
            message: message.into(),
            status: None,
        }
    }

    /// Submission failure caused by transport (no HTTP status)
    pub fn submission_transport(message: impl Into<String>) -> Self {
        MpesaError::Submission {
            message: message.into(),
            status: None,
        }
    }

    /// Name of the pipeline stage that failed (for logs)
    pub fn stage(&self) -> &'static str {
        match self {
            MpesaError::Configuration(_) => "configuration",
            MpesaError::TokenAcquisition { .. } => "token",
            MpesaError::Submission { .. } => "submission",
            MpesaError::Serialization(_) => "serialization",
        }
    }

    /// HTTP status returned by the gateway, if the failure got that far
    pub fn gateway_status(&self) -> Option<u16> {
        match self {
            MpesaError::TokenAcquisition { status, .. } | MpesaError::Submission { status, .. } => {
                *status
            }
            _ => None,
        }
    }
}

/// Result type alias for gateway operations
pub type MpesaResult<T> = Result<T, MpesaError>;
