//! # Push Payment Gateway Trait
//!
//! The seam between the HTTP layer and a concrete gateway client.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │        PushPaymentGateway (trait)            │
//! │  ├── initiate_push()                         │
//! │  └── provider_name()                         │
//! └──────────────────────────────────────────────┘
//!                       ▲
//!               ┌───────┴───────┐
//!               │ StkPushClient │  (mpesa-daraja)
//!               └───────────────┘
//! ```

use crate::error::MpesaResult;
use crate::payment::{PaymentResponse, PushRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// A gateway able to run one complete push payment flow.
#[async_trait]
pub trait PushPaymentGateway: Send + Sync {
    /// Authenticate, build the gateway payload, and submit it.
    ///
    /// Token acquisition always completes before submission starts; a token
    /// failure returns without contacting the payment endpoint.
    ///
    /// # Returns
    /// The gateway's raw 2xx response.
    async fn initiate_push(&self, request: &PushRequest) -> MpesaResult<PaymentResponse>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type SharedGateway = Arc<dyn PushPaymentGateway>;
