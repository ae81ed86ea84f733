//! # STK Push
//!
//! Implementation of the Lipa Na M-Pesa Online (STK push) request.
//! This is the only payment flow mpesa-stk-rs drives.

use crate::config::DarajaConfig;
use crate::token::TokenManager;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use mpesa_core::{
    AccessToken, MpesaError, MpesaResult, PaymentResponse, PushPaymentGateway, PushRequest,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Compact timestamp format the gateway expects (`YYYYMMDDHHMMSS`)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// STK push payload as sent on the wire.
///
/// Field names are the gateway contract and are kept exactly, including
/// `Security_Credetial`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StkPushPayload {
    #[serde(rename = "Business_ShortCode")]
    pub business_short_code: String,
    #[serde(rename = "Password")]
    pub password: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "InitiatorName")]
    pub initiator_name: String,
    #[serde(rename = "Security_Credetial")]
    pub security_credential: String,
    #[serde(rename = "phone_number")]
    pub phone_number: String,
    #[serde(rename = "Amount")]
    pub amount: serde_json::Number,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "TransactionType")]
    pub transaction_type: String,
    #[serde(rename = "AccountReference")]
    pub account_reference: String,
    #[serde(rename = "TransactionDesc")]
    pub transaction_desc: String,
}

/// Format a point in time the way the gateway expects
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// STK password: lowercase hex MD5 of `pass_key ++ timestamp`
pub fn generate_password(pass_key: &str, timestamp: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(pass_key.as_bytes());
    hasher.update(timestamp.as_bytes());
    hex::encode(hasher.finalize())
}

/// Daraja STK push client
///
/// Owns the token manager; one instance is shared by every request.
pub struct StkPushClient {
    config: DarajaConfig,
    client: Client,
    tokens: TokenManager,
}

impl StkPushClient {
    /// Create a new STK push client
    pub fn new(config: DarajaConfig) -> MpesaResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            MpesaError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        let tokens = TokenManager::new(&config, client.clone());

        Ok(Self {
            config,
            client,
            tokens,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> MpesaResult<Self> {
        let config = DarajaConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &DarajaConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Build the payload for a push, timestamped now
    pub fn build_payload(
        &self,
        phone_number: &str,
        amount: serde_json::Number,
        description: &str,
    ) -> StkPushPayload {
        self.build_payload_at(phone_number, amount, description, Utc::now())
    }

    /// Build the payload for a push with an explicit timestamp
    pub fn build_payload_at(
        &self,
        phone_number: &str,
        amount: serde_json::Number,
        description: &str,
        at: DateTime<Utc>,
    ) -> StkPushPayload {
        let timestamp = format_timestamp(at);

        StkPushPayload {
            business_short_code: self.config.business_short_code.clone(),
            password: generate_password(&self.config.pass_key, &timestamp),
            timestamp,
            initiator_name: self.config.initiator_name.clone(),
            security_credential: self.config.security_credential.clone(),
            phone_number: phone_number.to_string(),
            amount,
            currency: self.config.currency.clone(),
            transaction_type: self.config.transaction_type.clone(),
            account_reference: self.config.account_reference.clone(),
            transaction_desc: description.to_string(),
        }
    }

    /// Submit a payload using the stored token.
    ///
    /// Without a stored token the request goes out unauthenticated and the
    /// gateway decides.
    pub async fn submit(&self, url: &str, payload: &StkPushPayload) -> MpesaResult<PaymentResponse> {
        let token = self.tokens.current_token().await;
        if token.is_none() {
            warn!("Submitting STK push without an access token");
        }
        self.submit_with_token(url, payload, token.as_ref()).await
    }

    /// Submit a payload with an explicit bearer token
    #[instrument(skip(self, payload, token), fields(url = %url))]
    pub async fn submit_with_token(
        &self,
        url: &str,
        payload: &StkPushPayload,
        token: Option<&AccessToken>,
    ) -> MpesaResult<PaymentResponse> {
        let mut request = self.client.post(url).json(payload);
        if let Some(token) = token {
            request = request.header("Authorization", token.bearer_header());
        }

        let response = request.send().await.map_err(|e| {
            error!("Error sending STK push request: {}", e);
            MpesaError::submission_transport(e.to_string())
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.text().await.map_err(|e| {
            error!("Error reading STK push response: {}", e);
            MpesaError::Submission {
                message: e.to_string(),
                status: Some(status.as_u16()),
            }
        })?;

        if !status.is_success() {
            error!("STK push rejected: status={}, body={}", status, body);
            return Err(MpesaError::Submission {
                message: body,
                status: Some(status.as_u16()),
            });
        }

        debug!("STK push accepted: status={}", status);

        Ok(PaymentResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

#[async_trait]
impl PushPaymentGateway for StkPushClient {
    #[instrument(skip(self, request), fields(phone = %request.phone_number, amount = %request.amount))]
    async fn initiate_push(&self, request: &PushRequest) -> MpesaResult<PaymentResponse> {
        let token = self.tokens.acquire_token().await?;

        let payload = self.build_payload(
            &request.phone_number,
            request.amount.clone(),
            &request.description,
        );

        let response = self
            .submit_with_token(&self.config.stk_push_url(), &payload, Some(&token))
            .await?;

        info!(
            "STK push request sent successfully: status={}, timestamp={}",
            response.status, payload.timestamp
        );

        Ok(response)
    }

    fn provider_name(&self) -> &'static str {
        "mpesa"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> DarajaConfig {
        DarajaConfig::new("ck", "cs", "testapi", "pw", "174379", "cred", "passkey")
    }

    fn client_for(server: &MockServer) -> StkPushClient {
        StkPushClient::new(config().with_api_base_url(server.uri())).unwrap()
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    async fn mount_token(server: &MockServer, token: &str) {
        Mock::given(method("POST"))
            .and(path("/oauth/v1/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": token })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(fixed_time()), "20240101120000");
    }

    #[test]
    fn test_generate_password() {
        assert_eq!(
            generate_password("passkey", "20240101120000"),
            "970bdf53c8488f4eed66f92ec62b5664"
        );
        // Same inputs, same digest
        assert_eq!(
            generate_password("passkey", "20240101120000"),
            generate_password("passkey", "20240101120000")
        );
        // Either input changes the digest
        assert_ne!(
            generate_password("passkey", "20240101120000"),
            generate_password("passkey", "20240101120001")
        );
        assert_ne!(
            generate_password("passkey", "20240101120000"),
            generate_password("passkez", "20240101120000")
        );
    }

    #[test]
    fn test_build_payload() {
        let client = StkPushClient::new(config()).unwrap();
        let payload =
            client.build_payload_at("+254700000000", 100u64.into(), "test", fixed_time());

        assert_eq!(payload.phone_number, "+254700000000");
        assert_eq!(payload.amount, serde_json::Number::from(100u64));
        assert_eq!(payload.transaction_desc, "test");
        assert_eq!(payload.currency, "KES");
        assert_eq!(payload.transaction_type, "CustomerPayBillOnline");
        assert_eq!(payload.business_short_code, "174379");
        assert_eq!(payload.initiator_name, "testapi");
        assert_eq!(payload.timestamp, "20240101120000");
        assert_eq!(payload.password, generate_password("passkey", "20240101120000"));

        // Deterministic for a fixed timestamp
        assert_eq!(
            payload,
            client.build_payload_at("+254700000000", 100u64.into(), "test", fixed_time())
        );
    }

    #[test]
    fn test_payload_wire_names() {
        let client = StkPushClient::new(config()).unwrap();
        let payload =
            client.build_payload_at("+254700000000", 100u64.into(), "test", fixed_time());
        let wire = serde_json::to_value(&payload).unwrap();

        assert_eq!(wire["Business_ShortCode"], "174379");
        assert_eq!(wire["Security_Credetial"], "cred");
        assert_eq!(wire["phone_number"], "+254700000000");
        assert_eq!(wire["Amount"], 100);
        assert_eq!(wire["TransactionDesc"], "test");
        assert_eq!(wire["Currency"], "KES");
        assert_eq!(wire["TransactionType"], "CustomerPayBillOnline");
        assert_eq!(wire["AccountReference"], "YOUR_ACCOUNT_REFERENCE");
        assert_eq!(wire.as_object().unwrap().len(), 11);
    }

    #[tokio::test]
    async fn test_submit_returns_raw_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mpesa/stkpush/v1/process"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ResponseCode": "0", "CustomerMessage": "ok" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let payload = client.build_payload("+254700000000", 100u64.into(), "test");
        let response = client
            .submit(&client.config().stk_push_url(), &payload)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["ResponseCode"], "0");
        assert_eq!(response.content_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_zero_timeout_disables_client_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mpesa/stkpush/v1/process"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ResponseCode": "0" }))
                    .set_delay(std::time::Duration::from_millis(50)),
            )
            .mount(&server)
            .await;

        let mut config = config().with_api_base_url(server.uri());
        config.http_timeout = std::time::Duration::ZERO;
        assert_eq!(config.request_timeout(), None);

        let client = StkPushClient::new(config).unwrap();
        let payload = client.build_payload("+254700000000", 1u64.into(), "t");
        let response = client
            .submit(&client.config().stk_push_url(), &payload)
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_submit_uses_stored_token() {
        let server = MockServer::start().await;
        mount_token(&server, "stored").await;
        Mock::given(method("POST"))
            .and(path("/mpesa/stkpush/v1/process"))
            .and(header("Authorization", "Bearer stored"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.tokens().acquire_token().await.unwrap();

        let payload = client.build_payload("+254700000000", 1u64.into(), "t");
        client
            .submit(&client.config().stk_push_url(), &payload)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_submit_without_token_is_unauthenticated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mpesa/stkpush/v1/process"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Access Token"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let payload = client.build_payload("+254700000000", 1u64.into(), "t");
        let err = client
            .submit(&client.config().stk_push_url(), &payload)
            .await
            .unwrap_err();

        assert!(matches!(err, MpesaError::Submission { status: Some(401), .. }));
        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_initiate_push_sequence() {
        let server = MockServer::start().await;
        mount_token(&server, "T").await;
        Mock::given(method("POST"))
            .and(path("/mpesa/stkpush/v1/process"))
            .and(header("Authorization", "Bearer T"))
            .and(body_partial_json(json!({
                "phone_number": "+254700000000",
                "Amount": 100,
                "TransactionDesc": "test",
                "Currency": "KES",
                "TransactionType": "CustomerPayBillOnline"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ResponseCode": "0" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .initiate_push(&PushRequest::new("+254700000000", 100u64, "test"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(client.provider_name(), "mpesa");
    }

    #[tokio::test]
    async fn test_token_failure_skips_submission() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/v1/generate"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/mpesa/stkpush/v1/process"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .initiate_push(&PushRequest::new("+254700000000", 100u64, "test"))
            .await
            .unwrap_err();

        assert_eq!(err.stage(), "token");
    }

    #[tokio::test]
    async fn test_submission_failure_keeps_token() {
        let server = MockServer::start().await;
        mount_token(&server, "T").await;
        Mock::given(method("POST"))
            .and(path("/mpesa/stkpush/v1/process"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .initiate_push(&PushRequest::new("+254700000000", 100u64, "test"))
            .await
            .unwrap_err();

        assert!(matches!(err, MpesaError::Submission { status: Some(500), .. }));
        assert_eq!(client.tokens().current_token().await.unwrap().as_str(), "T");
    }
}
