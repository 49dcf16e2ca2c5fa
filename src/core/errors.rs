use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Error codes documented by Nexo Pro.
///
/// Anything outside this table is surfaced as [`RequestError::UnknownErrorCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorCode {
    InvalidApiKey,
    InvalidSignature,
    MalformedRequest,
    Unauthorized,
    InvalidWebsocketMethod,
    WebsocketAlreadyAuthenticated,
    InvalidNonce,
    NoResults,
    InternalError,
    UnsupportedExchanges,
    RateLimitExceeded,
}

impl ApiErrorCode {
    pub const ALL: [Self; 11] = [
        Self::InvalidApiKey,
        Self::InvalidSignature,
        Self::MalformedRequest,
        Self::Unauthorized,
        Self::InvalidWebsocketMethod,
        Self::WebsocketAlreadyAuthenticated,
        Self::InvalidNonce,
        Self::NoResults,
        Self::InternalError,
        Self::UnsupportedExchanges,
        Self::RateLimitExceeded,
    ];

    /// Look up a numeric code in the known table
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|known| known.code() == code)
    }

    pub const fn code(self) -> i64 {
        match self {
            Self::InvalidApiKey => 100,
            Self::InvalidSignature => 101,
            Self::MalformedRequest => 102,
            Self::Unauthorized => 103,
            Self::InvalidWebsocketMethod => 104,
            Self::WebsocketAlreadyAuthenticated => 105,
            Self::InvalidNonce => 106,
            Self::NoResults => 203,
            Self::InternalError => 206,
            Self::UnsupportedExchanges => 300,
            Self::RateLimitExceeded => 301,
        }
    }

    /// Description published alongside the code
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidApiKey => "API-Key is malformed or invalid.",
            Self::InvalidSignature => "Request signature is malformed or invalid.",
            Self::MalformedRequest => "Some request field is malformed or missing.",
            Self::Unauthorized => "Unauthorized.",
            Self::InvalidWebsocketMethod => "Websocket method is invalid.",
            Self::WebsocketAlreadyAuthenticated => "Websocket session is already authenticated.",
            Self::InvalidNonce => "Request nonce is malformed or invalid.",
            Self::NoResults => "No results found for specified query.",
            Self::InternalError => "Internal error.",
            Self::UnsupportedExchanges => "The given exchanges are unsupported for said pair.",
            Self::RateLimitExceeded => "Rate limit exceeded.",
        }
    }

    pub const fn is_rate_limit(self) -> bool {
        matches!(self, Self::RateLimitExceeded)
    }

    /// Codes that can only be fixed by correcting credentials, signature or nonce
    pub const fn is_auth_failure(self) -> bool {
        matches!(
            self,
            Self::InvalidApiKey | Self::InvalidSignature | Self::Unauthorized | Self::InvalidNonce
        )
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The server answered with a documented error code
#[derive(Error, Debug, Clone, PartialEq)]
#[error("APIError(code={}): {message}, {}", .code.code(), .code.description())]
pub struct ApiError {
    code: ApiErrorCode,
    message: String,
    raw_response: Value,
}

impl ApiError {
    /// Build from a decoded response body.
    ///
    /// Falls back to the table description when the body has no `errorMessage`.
    pub fn new(code: ApiErrorCode, message: Option<String>, raw_response: Value) -> Self {
        Self {
            code,
            message: message.unwrap_or_else(|| code.description().to_string()),
            raw_response,
        }
    }

    pub fn code(&self) -> i64 {
        self.code.code()
    }

    pub fn code_kind(&self) -> ApiErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn raw_response(&self) -> &Value {
        &self.raw_response
    }

    pub fn is_rate_limited(&self) -> bool {
        self.code.is_rate_limit()
    }

    pub fn is_auth_failure(&self) -> bool {
        self.code.is_auth_failure()
    }
}

/// Transport-level and protocol-level failures.
///
/// `request` fields echo the method and URL only, never headers.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Request timed out: {request}")]
    Timeout { request: String },

    #[error("Transport failure for {request}: {message}")]
    Transport { request: String, message: String },

    #[error("Failed to get API response: status {status}, request: {request}")]
    Status {
        status: u16,
        request: String,
        body: String,
    },

    #[error("Invalid response: status: {code}, message: {message}, request: {request}")]
    UnknownErrorCode {
        code: Value,
        message: String,
        request: String,
    },

    #[error("Invalid response body for {request}: {message}")]
    InvalidBody { request: String, message: String },

    #[error("Failed to serialize request parameters: {0}")]
    Serialization(String),

    #[error("Failed to project response into {target}: {message}")]
    Projection {
        target: &'static str,
        message: String,
    },
}

impl RequestError {
    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[derive(Error, Debug)]
pub enum NexoError {
    /// Rejected locally before anything was signed or sent
    #[error("Validation error: {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::core::config::ConfigError),

    #[error("Credentials error: {0}")]
    Credentials(String),
}

/// Coarse classification so callers can decide between fixing input,
/// handling a server rejection, or retrying later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Api,
    Request,
    Config,
}

impl NexoError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Api(_) => ErrorKind::Api,
            Self::Request(_) => ErrorKind::Request,
            Self::Config(_) | Self::Credentials(_) => ErrorKind::Config,
        }
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_rate_limited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_code_table() {
        for code in [100, 101, 102, 103, 104, 105, 106, 203, 206, 300, 301] {
            let known = ApiErrorCode::from_code(code).expect("documented code");
            assert_eq!(known.code(), code);
        }
        assert_eq!(ApiErrorCode::from_code(107), None);
        assert_eq!(ApiErrorCode::from_code(0), None);
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::new(
            ApiErrorCode::InvalidApiKey,
            Some("API Key doesn't exist".to_string()),
            json!({"errorCode": 100, "errorMessage": "API Key doesn't exist"}),
        );
        assert_eq!(
            err.to_string(),
            "APIError(code=100): API Key doesn't exist, API-Key is malformed or invalid."
        );
    }

    #[test]
    fn test_api_error_message_falls_back_to_table() {
        let err = ApiError::new(ApiErrorCode::RateLimitExceeded, None, json!({"errorCode": 301}));
        assert_eq!(err.message(), "Rate limit exceeded.");
        assert!(err.is_rate_limited());
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn test_error_kinds() {
        let err = NexoError::validation("side", "must be one of: buy, sell");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("side"));

        let err: NexoError = RequestError::Timeout {
            request: "GET https://pro-api.nexo.io/api/v1/pairs".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Request);

        let err: NexoError = ApiError::new(ApiErrorCode::Unauthorized, None, Value::Null).into();
        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(err.api_error().is_some_and(ApiError::is_auth_failure));
    }
}
