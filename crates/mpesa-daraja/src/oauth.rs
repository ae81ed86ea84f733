//! # OAuth 1.0a Request Signing
//!
//! Signs the token request the way RFC 5849 describes: a signature base
//! string over method, base URL and normalized parameters, keyed by the
//! consumer secret and token secret.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use mpesa_core::{MpesaError, MpesaResult};
use reqwest::Url;
use sha1::Sha1;
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const OAUTH_VERSION: &str = "1.0";

/// HMAC flavour used for `oauth_signature`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureMethod {
    #[default]
    HmacSha1,
    HmacSha256,
}

impl SignatureMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureMethod::HmacSha1 => "HMAC-SHA1",
            SignatureMethod::HmacSha256 => "HMAC-SHA256",
        }
    }

    /// Base64 HMAC of `base_string` under `key`
    fn sign(&self, key: &str, base_string: &str) -> String {
        match self {
            SignatureMethod::HmacSha1 => hmac_base64::<Hmac<Sha1>>(key, base_string),
            SignatureMethod::HmacSha256 => hmac_base64::<Hmac<Sha256>>(key, base_string),
        }
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureMethod {
    type Err = MpesaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HMAC-SHA1" => Ok(SignatureMethod::HmacSha1),
            "HMAC-SHA256" => Ok(SignatureMethod::HmacSha256),
            other => Err(MpesaError::Configuration(format!(
                "Unsupported OAuth signature method: {}",
                other
            ))),
        }
    }
}

fn hmac_base64<M: Mac + KeyInit>(key: &str, message: &str) -> String {
    let mut mac = <M as KeyInit>::new_from_slice(key.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// RFC 3986 percent-encoding (everything but `A-Z a-z 0-9 - _ . ~`)
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Consumer and token credentials for one signer
#[derive(Clone)]
pub struct OAuthSigner {
    consumer_key: String,
    consumer_secret: String,
    token_key: String,
    token_secret: String,
    method: SignatureMethod,
}

impl OAuthSigner {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        token_key: impl Into<String>,
        token_secret: impl Into<String>,
        method: SignatureMethod,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token_key: token_key.into(),
            token_secret: token_secret.into(),
            method,
        }
    }

    /// Build an `Authorization` header with a fresh nonce and timestamp
    pub fn authorization_header(&self, http_method: &str, url: &str) -> MpesaResult<String> {
        let nonce = Uuid::new_v4().simple().to_string();
        self.authorization_header_with(http_method, url, &nonce, Utc::now().timestamp())
    }

    /// Build an `Authorization` header with an explicit nonce and timestamp
    pub fn authorization_header_with(
        &self,
        http_method: &str,
        url: &str,
        nonce: &str,
        timestamp: i64,
    ) -> MpesaResult<String> {
        let mut oauth_params = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), self.method.as_str().to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_token".to_string(), self.token_key.clone()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];

        let base_string = signature_base_string(http_method, url, &oauth_params)?;
        let signing_key = format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(&self.token_secret)
        );
        let signature = self.method.sign(&signing_key, &base_string);

        oauth_params.push(("oauth_signature".to_string(), signature));
        oauth_params.sort();

        let fields: Vec<String> = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect();

        Ok(format!("OAuth {}", fields.join(", ")))
    }
}

impl fmt::Debug for OAuthSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthSigner")
            .field("consumer_key", &self.consumer_key)
            .field("token_key", &self.token_key)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// `METHOD&enc(base_url)&enc(normalized params)`
///
/// Query parameters of `url` are folded into the normalized parameter set.
pub fn signature_base_string(
    http_method: &str,
    url: &str,
    oauth_params: &[(String, String)],
) -> MpesaResult<String> {
    let parsed = Url::parse(url).map_err(|e| {
        MpesaError::Configuration(format!("Invalid URL for OAuth signing {:?}: {}", url, e))
    })?;

    let host = parsed
        .host_str()
        .ok_or_else(|| MpesaError::Configuration(format!("URL has no host: {}", url)))?;

    // Url::port() is None for the scheme's default port
    let base_url = match parsed.port() {
        Some(port) => format!("{}://{}:{}{}", parsed.scheme(), host, port, parsed.path()),
        None => format!("{}://{}{}", parsed.scheme(), host, parsed.path()),
    };

    let mut encoded: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (percent_encode(&k), percent_encode(&v)))
        .chain(
            oauth_params
                .iter()
                .map(|(k, v)| (percent_encode(k), percent_encode(v))),
        )
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!(
        "{}&{}&{}",
        http_method.to_ascii_uppercase(),
        percent_encode(&base_url),
        percent_encode(&normalized)
    ))
}
