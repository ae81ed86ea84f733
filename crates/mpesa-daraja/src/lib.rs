//! # mpesa-daraja
//!
//! Safaricom Daraja (M-Pesa) STK push client for mpesa-stk-rs.
//!
//! A push runs as one explicit pipeline:
//!
//! 1. **TokenManager** - signs an OAuth 1.0a request to the token endpoint
//!    and stores the bearer token it gets back
//! 2. **StkPushClient::build_payload** - timestamps the request and derives
//!    the password from the pass key
//! 3. **StkPushClient::submit_with_token** - posts the payload with that
//!    same token and hands back the gateway's raw response
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mpesa_daraja::StkPushClient;
//! use mpesa_core::{PushPaymentGateway, PushRequest};
//!
//! // Create client from environment
//! let client = StkPushClient::from_env()?;
//!
//! // Prompt the payer's phone
//! let response = client
//!     .initiate_push(&PushRequest::new("+254700000000", 100u64, "Order 42"))
//!     .await?;
//! ```

pub mod config;
pub mod oauth;
pub mod stk;
pub mod token;

// Re-exports
pub use config::DarajaConfig;
pub use oauth::{OAuthSigner, SignatureMethod};
pub use stk::{generate_password, StkPushClient, StkPushPayload};
pub use token::TokenManager;
