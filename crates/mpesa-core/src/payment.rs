//! # Payment Types
//!
//! Values that flow through one STK push: the caller's intent, the bearer
//! token that authorizes it, and the gateway's reply.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A payer prompt requested by a caller.
///
/// Nothing here is validated: the gateway is the authority on MSISDN format
/// and amount rules, and rejects what it does not accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushRequest {
    /// Payer MSISDN (e.g. `+254700000000`)
    pub phone_number: String,
    /// Amount as a JSON number, forwarded to the gateway verbatim
    pub amount: serde_json::Number,
    /// Short free-text description shown to the payer
    pub description: String,
}

impl PushRequest {
    pub fn new(
        phone_number: impl Into<String>,
        amount: impl Into<serde_json::Number>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            phone_number: phone_number.into(),
            amount: amount.into(),
            description: description.into(),
        }
    }
}

/// Short-lived bearer token issued by the gateway's token endpoint.
///
/// Expiry is not tracked; every payment flow acquires a fresh one.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Raw gateway response, passed through to the caller unmodified.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentResponse {
    /// HTTP status code
    pub status: u16,
    /// `Content-Type` reported by the gateway, if any
    pub content_type: Option<String>,
    /// Body text exactly as received
    pub body: String,
}
