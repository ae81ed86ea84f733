//! # Access Token Manager
//!
//! Exchanges the configured credentials for a bearer token at the Daraja
//! token endpoint and remembers the last one issued.

use crate::config::DarajaConfig;
use crate::oauth::OAuthSigner;
use mpesa_core::{AccessToken, MpesaError, MpesaResult};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

/// Holds the OAuth signer and the most recently issued token.
///
/// The token is overwritten on every successful acquisition and never
/// invalidated; expiry is not tracked.
#[derive(Debug)]
pub struct TokenManager {
    signer: OAuthSigner,
    token_url: String,
    client: Client,
    token: RwLock<Option<AccessToken>>,
}

impl TokenManager {
    /// Create a token manager sharing an existing HTTP client
    pub fn new(config: &DarajaConfig, client: Client) -> Self {
        let signer = OAuthSigner::new(
            &config.consumer_key,
            &config.consumer_secret,
            &config.initiator_name,
            &config.initiator_password,
            config.signature_method,
        );

        Self {
            signer,
            token_url: config.token_url(),
            client,
            token: RwLock::new(None),
        }
    }

    /// Request a fresh token, store it, and return it.
    ///
    /// Any transport failure, non-2xx status, or body without an
    /// `access_token` is a `TokenAcquisition` error. No retry.
    #[instrument(skip(self), fields(url = %self.token_url))]
    pub async fn acquire_token(&self) -> MpesaResult<AccessToken> {
        let authorization = self
            .signer
            .authorization_header("POST", &self.token_url)
            .map_err(|e| MpesaError::token_transport(e.to_string()))?;

        let response = self
            .client
            .post(&self.token_url)
            .header("Authorization", authorization)
            .send()
            .await
            .map_err(|e| {
                error!("Error generating access token: {}", e);
                MpesaError::token_transport(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Error reading token response: {}", e);
            MpesaError::TokenAcquisition {
                message: e.to_string(),
                status: Some(status.as_u16()),
            }
        })?;

        if !status.is_success() {
            error!("Token endpoint rejected request: status={}, body={}", status, body);
            return Err(MpesaError::TokenAcquisition {
                message: body,
                status: Some(status.as_u16()),
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Token response is not usable: {}", e);
            MpesaError::TokenAcquisition {
                message: format!("Failed to parse token response: {}", e),
                status: Some(status.as_u16()),
            }
        })?;

        if let Some(expires_in) = &parsed.expires_in {
            debug!("Token expires in {} seconds", expires_in);
        }

        let token = AccessToken::new(parsed.access_token);
        *self.token.write().await = Some(token.clone());

        info!("Acquired Daraja access token");
        Ok(token)
    }

    /// The last token acquired, if any
    pub async fn current_token(&self) -> Option<AccessToken> {
        self.token.read().await.clone()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Daraja sends this as a string ("3599"); kept loose
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
}
