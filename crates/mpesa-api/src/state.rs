//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the push payment gateway and server configuration.

use mpesa_core::{MpesaError, SharedGateway};
use mpesa_daraja::StkPushClient;
use std::net::SocketAddr;
use std::sync::Arc;

pub const DEFAULT_PORT: u16 = 3001;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Payer used when a request omits `phoneNumber`
    pub default_phone_number: Option<String>,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, MpesaError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MpesaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                MpesaError::Configuration(format!("PORT must be a valid port number, got {:?}", raw))
            })?,
            None => DEFAULT_PORT,
        };

        let config = Self {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            default_phone_number: get("PHONE_NUMBER"),
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        };

        // Fail at startup rather than at bind time
        config.socket_addr()?;

        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, MpesaError> {
        format!("{}:{}", self.host, self.port).parse().map_err(|_| {
            MpesaError::Configuration(format!(
                "Invalid socket address: {}:{}",
                self.host, self.port
            ))
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Push payment gateway
    pub gateway: SharedGateway,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState backed by the Daraja client
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let client = StkPushClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize M-Pesa client: {}", e))?;

        tracing::info!(
            "Daraja endpoint: {} (sandbox={})",
            client.config().api_base_url,
            client.config().is_sandbox()
        );

        Ok(Self::with_gateway(config, Arc::new(client)))
    }

    /// Create state around an existing gateway
    pub fn with_gateway(config: AppConfig, gateway: SharedGateway) -> Self {
        Self { gateway, config }
    }
}
