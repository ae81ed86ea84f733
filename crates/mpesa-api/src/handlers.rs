//! # Request Handlers
//!
//! Axum request handlers for the STK push API.

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use mpesa_core::PushRequest;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

/// Body returned for any failure in the push pipeline
pub const STK_PUSH_FAILED: &str = "Failed to initiate STK push";

// =============================================================================
// Request/Response Types
// =============================================================================

/// STK push request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StkPushRequest {
    /// Payer MSISDN (falls back to the configured default)
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Amount, forwarded as given
    pub amount: serde_json::Number,
    /// Transaction description
    pub description: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "mpesa-stk",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Initiate an STK push and pass the gateway's answer through
#[instrument(skip(state, body), fields(provider = state.gateway.provider_name()))]
pub async fn stk_push(
    State(state): State<AppState>,
    body: Result<Json<StkPushRequest>, JsonRejection>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    // Malformed bodies fail like any other push failure
    let Json(request) = body.map_err(|rejection| {
        error!("Rejected STK push body: {}", rejection.body_text());
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(STK_PUSH_FAILED)),
        )
    })?;

    let phone_number = request
        .phone_number
        .or_else(|| state.config.default_phone_number.clone())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("phoneNumber is required")),
            )
        })?;

    let push = PushRequest {
        phone_number,
        amount: request.amount,
        description: request.description,
    };

    let response = state.gateway.initiate_push(&push).await.map_err(|e| {
        error!(
            stage = e.stage(),
            gateway_status = e.gateway_status(),
            "Failed to initiate STK push: {}",
            e
        );
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(STK_PUSH_FAILED)),
        )
    })?;

    info!("STK push accepted by gateway: status={}", response.status);

    let content_type = response
        .content_type
        .unwrap_or_else(|| "application/json".to_string());

    Ok((StatusCode::OK, [(CONTENT_TYPE, content_type)], response.body).into_response())
}
