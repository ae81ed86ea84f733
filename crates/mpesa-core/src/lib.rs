//! # mpesa-core
//!
//! Core types and traits for the mpesa-stk-rs push payment client.
//!
//! This crate provides:
//! - `PushPaymentGateway` trait for gateway clients
//! - `PushRequest`, `AccessToken` and `PaymentResponse` for the push flow
//! - `MpesaError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use mpesa_core::{PushPaymentGateway, PushRequest};
//!
//! let request = PushRequest::new("+254700000000", 100u64, "Order 42");
//! let response = gateway.initiate_push(&request).await?;
//! println!("gateway answered {}: {}", response.status, response.body);
//! ```

pub mod error;
pub mod gateway;
pub mod payment;

// Re-exports for convenience
pub use error::{MpesaError, MpesaResult};
pub use gateway::{PushPaymentGateway, SharedGateway};
pub use payment::{AccessToken, PaymentResponse, PushRequest};
