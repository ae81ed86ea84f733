//! # mpesa-api
//!
//! HTTP API layer for mpesa-stk-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The STK push endpoint backed by the Daraja client
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/stkpush` | Initiate an STK push |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
