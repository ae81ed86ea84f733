//! # Daraja Configuration
//!
//! Credentials and settings for the Daraja (M-Pesa) API.
//! All secrets are loaded from environment variables.

use crate::oauth::SignatureMethod;
use mpesa_core::MpesaError;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://sandbox.safaricom.co.ke";
pub const DEFAULT_CURRENCY: &str = "KES";
pub const DEFAULT_TRANSACTION_TYPE: &str = "CustomerPayBillOnline";
pub const DEFAULT_ACCOUNT_REFERENCE: &str = "YOUR_ACCOUNT_REFERENCE";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

const TOKEN_PATH: &str = "/oauth/v1/generate?grant_type=client_credentials";
const STK_PUSH_PATH: &str = "/mpesa/stkpush/v1/process";

/// Daraja API configuration
#[derive(Clone)]
pub struct DarajaConfig {
    /// OAuth consumer key
    pub consumer_key: String,

    /// OAuth consumer secret (signing key)
    pub consumer_secret: String,

    /// Initiator username (OAuth token key, `InitiatorName`)
    pub initiator_name: String,

    /// Initiator password (OAuth token secret)
    pub initiator_password: String,

    /// Paybill / till number
    pub business_short_code: String,

    /// Encrypted initiator credential
    pub security_credential: String,

    /// Lipa Na M-Pesa pass key (STK password input)
    pub pass_key: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// Settlement currency sent with every push
    pub currency: String,

    /// Transaction type sent with every push
    pub transaction_type: String,

    /// Account reference sent with every push
    pub account_reference: String,

    /// OAuth signature method for the token request
    pub signature_method: SignatureMethod,

    /// Per-request timeout for outbound calls (zero disables it)
    pub http_timeout: Duration,
}

impl DarajaConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `CONSUMER_KEY`
    /// - `CONSUMER_SECRET`
    /// - `INITIATOR_NAME`
    /// - `INITIATOR_PASSWORD`
    /// - `BUSINESS_SHORTCODE`
    /// - `SECURITY_CREDENTIAL`
    /// - `PASS_KEY`
    pub fn from_env() -> Result<Self, MpesaError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MpesaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| MpesaError::Configuration(format!("{} not set", key)))
        };

        let consumer_key = require("CONSUMER_KEY")?;
        let consumer_secret = require("CONSUMER_SECRET")?;
        let initiator_name = require("INITIATOR_NAME")?;
        let initiator_password = require("INITIATOR_PASSWORD")?;
        let business_short_code = require("BUSINESS_SHORTCODE")?;
        let security_credential = require("SECURITY_CREDENTIAL")?;
        let pass_key = require("PASS_KEY")?;

        let signature_method = match get("DARAJA_SIGNATURE_METHOD") {
            Some(raw) => raw.parse()?,
            None => SignatureMethod::default(),
        };

        let http_timeout = match get("DARAJA_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                MpesaError::Configuration(format!(
                    "DARAJA_HTTP_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                    raw
                ))
            })?,
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let api_base_url = get("DARAJA_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Ok(Self {
            consumer_key,
            consumer_secret,
            initiator_name,
            initiator_password,
            business_short_code,
            security_credential,
            pass_key,
            api_base_url,
            currency: get("DARAJA_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            transaction_type: get("DARAJA_TRANSACTION_TYPE")
                .unwrap_or_else(|| DEFAULT_TRANSACTION_TYPE.to_string()),
            account_reference: get("DARAJA_ACCOUNT_REFERENCE")
                .unwrap_or_else(|| DEFAULT_ACCOUNT_REFERENCE.to_string()),
            signature_method,
            http_timeout,
        })
    }

    /// Create config with explicit credentials (for testing)
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        initiator_name: impl Into<String>,
        initiator_password: impl Into<String>,
        business_short_code: impl Into<String>,
        security_credential: impl Into<String>,
        pass_key: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            initiator_name: initiator_name.into(),
            initiator_password: initiator_password.into(),
            business_short_code: business_short_code.into(),
            security_credential: security_credential.into(),
            pass_key: pass_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            transaction_type: DEFAULT_TRANSACTION_TYPE.to_string(),
            account_reference: DEFAULT_ACCOUNT_REFERENCE.to_string(),
            signature_method: SignatureMethod::default(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Token endpoint, including the `grant_type` query
    pub fn token_url(&self) -> String {
        format!("{}{}", self.api_base_url, TOKEN_PATH)
    }

    /// STK push processing endpoint
    pub fn stk_push_url(&self) -> String {
        format!("{}{}", self.api_base_url, STK_PUSH_PATH)
    }

    /// Timeout to apply to outbound calls, `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (!self.http_timeout.is_zero()).then_some(self.http_timeout)
    }

    /// Check if pointed at the Daraja sandbox
    pub fn is_sandbox(&self) -> bool {
        self.api_base_url.contains("sandbox.")
    }
}

impl fmt::Debug for DarajaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DarajaConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"***")
            .field("initiator_name", &self.initiator_name)
            .field("initiator_password", &"***")
            .field("business_short_code", &self.business_short_code)
            .field("security_credential", &"***")
            .field("pass_key", &"***")
            .field("api_base_url", &self.api_base_url)
            .field("currency", &self.currency)
            .field("transaction_type", &self.transaction_type)
            .field("account_reference", &self.account_reference)
            .field("signature_method", &self.signature_method)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}
