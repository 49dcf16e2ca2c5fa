use crate::core::errors::NexoError;
use base64::engine::general_purpose;
use base64::Engine;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

pub const HEADER_API_KEY: &str = "X-API-KEY";
pub const HEADER_NONCE: &str = "X-NONCE";
pub const HEADER_SIGNATURE: &str = "X-SIGNATURE";

/// Result type for signing operations: auth headers to attach to the request
pub type SignatureResult = Result<Vec<(&'static str, String)>, NexoError>;

/// How the HMAC digest is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureEncoding {
    Hex,
    #[default]
    Base64,
}

/// What the HMAC is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignaturePayload {
    /// The decimal nonce string
    #[default]
    Nonce,
    /// The canonical, form-encoded query string
    QueryString,
}

/// Signature scheme. The default (nonce, base64) is what Nexo Pro verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignatureMode {
    pub payload: SignaturePayload,
    pub encoding: SignatureEncoding,
}

impl SignatureMode {
    pub const fn new(payload: SignaturePayload, encoding: SignatureEncoding) -> Self {
        Self { payload, encoding }
    }
}

/// HMAC-SHA256 of `message` keyed with `secret`.
///
/// Fails with [`NexoError::Credentials`] on an empty secret; nothing is ever
/// signed with an empty key.
pub fn sign(secret: &str, message: &str, encoding: SignatureEncoding) -> Result<String, NexoError> {
    if secret.is_empty() {
        return Err(NexoError::Credentials(
            "API secret is empty; refusing to sign".to_string(),
        ));
    }

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| NexoError::Credentials(format!("Invalid secret key: {}", e)))?;
    mac.update(message.as_bytes());
    let digest = mac.finalize().into_bytes();

    Ok(match encoding {
        SignatureEncoding::Hex => hex::encode(digest),
        SignatureEncoding::Base64 => general_purpose::STANDARD.encode(digest),
    })
}

/// Signer trait for request authentication
///
/// Implementations turn one prepared request into the headers that
/// authenticate it. The dispatcher calls this once per request with a fresh
/// nonce.
pub trait Signer: Send + Sync {
    /// Sign a request and return the auth headers
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, etc.)
    /// * `endpoint` - API endpoint path, relative to the versioned prefix
    /// * `query_string` - Canonical query string (without leading '?')
    /// * `body` - Compact JSON body, empty for GET
    /// * `nonce` - Request nonce in milliseconds
    fn sign_request(
        &self,
        method: &str,
        endpoint: &str,
        query_string: &str,
        body: &[u8],
        nonce: u64,
    ) -> SignatureResult;
}

/// HMAC-SHA256 signer producing the `X-API-KEY`/`X-NONCE`/`X-SIGNATURE` triple
pub struct HmacSigner {
    api_key: Secret<String>,
    secret_key: Secret<String>,
    mode: SignatureMode,
}

impl HmacSigner {
    /// Create a new HMAC signer
    ///
    /// # Arguments
    /// * `api_key` - Public API key, sent verbatim in `X-API-KEY`
    /// * `secret_key` - Shared secret used as the HMAC key
    /// * `mode` - Signature payload and encoding
    pub fn new(
        api_key: Secret<String>,
        secret_key: Secret<String>,
        mode: SignatureMode,
    ) -> Result<Self, NexoError> {
        if secret_key.expose_secret().is_empty() {
            return Err(NexoError::Credentials(
                "API secret must not be empty".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            secret_key,
            mode,
        })
    }

    pub fn mode(&self) -> SignatureMode {
        self.mode
    }
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSigner")
            .field("api_key", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .field("mode", &self.mode)
            .finish()
    }
}

impl Signer for HmacSigner {
    fn sign_request(
        &self,
        _method: &str,
        _endpoint: &str,
        query_string: &str,
        _body: &[u8],
        nonce: u64,
    ) -> SignatureResult {
        let nonce = nonce.to_string();
        let message = match self.mode.payload {
            SignaturePayload::Nonce => nonce.as_str(),
            SignaturePayload::QueryString => query_string,
        };

        let signature = sign(self.secret_key.expose_secret(), message, self.mode.encoding)?;

        Ok(vec![
            (HEADER_API_KEY, self.api_key.expose_secret().clone()),
            (HEADER_NONCE, nonce),
            (HEADER_SIGNATURE, signature),
        ])
    }
}
