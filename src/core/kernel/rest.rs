use crate::core::config::ConfigError;
use crate::core::errors::{NexoError, RequestError};
use crate::core::kernel::classify::classify;
use crate::core::kernel::nonce::{Clock, NonceSource};
use crate::core::kernel::params::RequestParams;
use crate::core::kernel::signer::Signer;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, trace};

pub const DEFAULT_BASE_URL: &str = "https://pro-api.nexo.io";
pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_USER_AGENT: &str = concat!("nexo-pro-rust/", env!("CARGO_PKG_VERSION"));

/// Configuration for the request dispatcher
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestClientConfig {
    /// Base URL for the API, without the `/api/<version>` prefix
    pub base_url: String,
    pub api_version: String,
    /// Per-request timeout
    pub timeout: Duration,
    pub user_agent: String,
}

impl RestClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// One exchange operation, validated and ready to be signed
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub method: Method,
    pub endpoint: String,
    pub params: RequestParams,
    /// Overrides the configured API version for this call only
    pub api_version: Option<String>,
}

impl ApiCall {
    pub fn new(method: Method, endpoint: impl Into<String>, params: RequestParams) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            params,
            api_version: None,
        }
    }

    pub fn get(endpoint: impl Into<String>, params: RequestParams) -> Self {
        Self::new(Method::GET, endpoint, params)
    }

    pub fn post(endpoint: impl Into<String>, params: RequestParams) -> Self {
        Self::new(Method::POST, endpoint, params)
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }
}

/// A fully built wire request. Both execution modes send exactly this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl PreparedRequest {
    /// Method and URL, safe to put in errors and logs
    pub fn echo(&self) -> String {
        format!("{} {}", self.method, self.url)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and undecoded body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends prepared requests without blocking the caller's thread
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse, NexoError>;
}

/// Sends prepared requests on the calling thread
pub trait BlockingTransport: Send + Sync {
    fn execute(&self, request: PreparedRequest) -> Result<RawResponse, NexoError>;
}

/// Timeouts are told apart; everything else is an opaque transport failure.
/// The echo already carries the URL, so it is stripped from the message.
fn transport_error(err: reqwest::Error, request: &PreparedRequest) -> NexoError {
    if err.is_timeout() {
        RequestError::Timeout {
            request: request.echo(),
        }
    } else {
        RequestError::Transport {
            request: request.echo(),
            message: err.without_url().to_string(),
        }
    }
    .into()
}

fn http_client_error(err: &reqwest::Error) -> NexoError {
    ConfigError::InvalidConfiguration(format!("Failed to build HTTP client: {}", err)).into()
}

/// Concurrent transport over one pooled `reqwest::Client`
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &RestClientConfig) -> Result<Self, NexoError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| http_client_error(&e))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl AsyncTransport for ReqwestTransport {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse, NexoError> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(e, &request))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, &request))?;

        Ok(RawResponse { status, body })
    }
}

/// Blocking transport over one pooled `reqwest::blocking::Client`.
///
/// Must not be created or dropped from inside an async runtime.
#[derive(Clone, Debug)]
pub struct BlockingReqwestTransport {
    client: reqwest::blocking::Client,
}

impl BlockingReqwestTransport {
    pub fn new(config: &RestClientConfig) -> Result<Self, NexoError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| http_client_error(&e))?;

        Ok(Self { client })
    }
}

impl BlockingTransport for BlockingReqwestTransport {
    fn execute(&self, request: PreparedRequest) -> Result<RawResponse, NexoError> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(|e| transport_error(e, &request))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| transport_error(e, &request))?;

        Ok(RawResponse { status, body })
    }
}

/// Signs, sends and classifies API calls over a pluggable transport.
///
/// Request preparation and classification are shared by the async and
/// blocking paths, so both put identical requests on the wire.
pub struct Dispatcher<T> {
    config: RestClientConfig,
    signer: Arc<dyn Signer>,
    nonces: Arc<NonceSource>,
    transport: T,
}

impl<T> std::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("nonces", &self.nonces)
            .finish_non_exhaustive()
    }
}

impl<T> Dispatcher<T> {
    pub fn config(&self) -> &RestClientConfig {
        &self.config
    }

    pub fn nonces(&self) -> &NonceSource {
        &self.nonces
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, call: &ApiCall) -> String {
        let version = call
            .api_version
            .as_deref()
            .unwrap_or(&self.config.api_version);
        format!(
            "{}/api/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            version,
            call.endpoint.trim_start_matches('/')
        )
    }

    /// Build the signed wire request for `call`.
    ///
    /// Draws one nonce. GET carries the canonical query string; any other
    /// method carries the compact JSON body, omitted when there are no params.
    pub fn prepare(&self, call: &ApiCall) -> Result<PreparedRequest, NexoError> {
        let query_string = call.params.to_query_string()?;
        let mut url = self.url(call);

        let body = if call.method == Method::GET {
            if !query_string.is_empty() {
                url.push('?');
                url.push_str(&query_string);
            }
            None
        } else if call.params.is_empty() {
            None
        } else {
            Some(call.params.to_compact_json()?)
        };

        let nonce = self.nonces.next();
        let auth_headers = self.signer.sign_request(
            call.method.as_str(),
            &call.endpoint,
            &query_string,
            body.as_deref().unwrap_or_default().as_bytes(),
            nonce,
        )?;

        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), self.config.user_agent.clone()),
        ];
        headers.extend(
            auth_headers
                .into_iter()
                .map(|(name, value)| (name.to_string(), value)),
        );

        Ok(PreparedRequest {
            method: call.method.clone(),
            url,
            headers,
            body,
        })
    }
}

impl<T: AsyncTransport> Dispatcher<T> {
    #[instrument(skip(self, call), fields(method = %call.method, endpoint = %call.endpoint))]
    pub async fn dispatch(&self, call: ApiCall) -> Result<Value, NexoError> {
        let request = self.prepare(&call)?;
        let echo = request.echo();
        debug!(request = %echo, "Sending request");

        let response = self.transport.execute(request).await?;
        trace!(status = response.status, "Response body: {}", response.body);

        classify(response.status, &response.body, &echo)
    }
}

impl<T: BlockingTransport> Dispatcher<T> {
    #[instrument(skip(self, call), fields(method = %call.method, endpoint = %call.endpoint))]
    pub fn dispatch_blocking(&self, call: ApiCall) -> Result<Value, NexoError> {
        let request = self.prepare(&call)?;
        let echo = request.echo();
        debug!(request = %echo, "Sending request");

        let response = self.transport.execute(request)?;
        trace!(status = response.status, "Response body: {}", response.body);

        classify(response.status, &response.body, &echo)
    }
}

/// Builder for creating dispatcher instances
pub struct DispatcherBuilder {
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
    nonces: Option<Arc<NonceSource>>,
}

impl DispatcherBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self {
            config,
            signer: None,
            nonces: None,
        }
    }

    /// Set the signer for authenticated requests
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_nonce_source(mut self, nonces: Arc<NonceSource>) -> Self {
        self.nonces = Some(nonces);
        self
    }

    /// Shorthand for a fresh nonce source over `clock`
    pub fn with_clock(self, clock: Clock) -> Self {
        self.with_nonce_source(Arc::new(NonceSource::new(clock)))
    }

    /// Every Nexo Pro endpoint is authenticated, so a signer is required
    pub fn build<T>(self, transport: T) -> Result<Dispatcher<T>, NexoError> {
        let signer = self.signer.ok_or_else(|| {
            NexoError::Credentials("Authentication required but no signer provided".to_string())
        })?;

        Ok(Dispatcher {
            config: self.config,
            signer,
            nonces: self.nonces.unwrap_or_default(),
            transport,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;
    use crate::core::kernel::signer::{HmacSigner, SignatureMode};
    use secrecy::Secret;
    use std::sync::Mutex;

    const NONCE: u64 = 1_700_000_000_000;

    #[derive(Default)]
    struct ScriptedTransport {
        sent: Mutex<Vec<PreparedRequest>>,
        reply: Option<RawResponse>,
    }

    impl ScriptedTransport {
        fn replying(status: u16, body: &str) -> Self {
            Self {
                sent: Mutex::default(),
                reply: Some(RawResponse::new(status, body)),
            }
        }

        fn sent(&self) -> Vec<PreparedRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl BlockingTransport for ScriptedTransport {
        fn execute(&self, request: PreparedRequest) -> Result<RawResponse, NexoError> {
            let echo = request.echo();
            self.sent.lock().unwrap().push(request);
            self.reply.clone().ok_or_else(|| {
                RequestError::Timeout { request: echo }.into()
            })
        }
    }

    fn dispatcher(transport: ScriptedTransport) -> Dispatcher<ScriptedTransport> {
        let signer = HmacSigner::new(
            Secret::new("public".to_string()),
            Secret::new("secret".to_string()),
            SignatureMode::default(),
        )
        .unwrap();

        DispatcherBuilder::new(RestClientConfig::new("https://pro-api.nexo.io/"))
            .with_signer(Arc::new(signer))
            .with_clock(Arc::new(|| NONCE))
            .build(transport)
            .unwrap()
    }

    #[test]
    fn test_prepare_get_puts_params_in_query() {
        let dispatcher = dispatcher(ScriptedTransport::default());
        let call = ApiCall::get(
            "quote",
            RequestParams::new()
                .with("side", "buy")
                .with("pair", "ETH/USDT")
                .with("amount", 100),
        );

        let request = dispatcher.prepare(&call).unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.url,
            "https://pro-api.nexo.io/api/v1/quote?amount=100&pair=ETH%2FUSDT&side=buy"
        );
        assert_eq!(request.body, None);
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.header("X-API-KEY"), Some("public"));
        assert_eq!(request.header("X-NONCE"), Some("1700000000000"));
        assert_eq!(
            request.header("X-SIGNATURE"),
            Some("T+LOEv1r7F4GSLI7+/8Vi6X8GLOiFLTCBzFGcUSKleE=")
        );
    }

    #[test]
    fn test_prepare_post_puts_params_in_body() {
        let dispatcher = dispatcher(ScriptedTransport::default());
        let call = ApiCall::post(
            "orders/cancel",
            RequestParams::new().with("orderId", "abc"),
        );

        let request = dispatcher.prepare(&call).unwrap();
        assert_eq!(request.url, "https://pro-api.nexo.io/api/v1/orders/cancel");
        assert_eq!(request.body.as_deref(), Some(r#"{"orderId":"abc"}"#));
    }

    #[test]
    fn test_prepare_post_without_params_has_no_body() {
        let dispatcher = dispatcher(ScriptedTransport::default());
        let call = ApiCall::post("futures/close-all-positions", RequestParams::new());
        let request = dispatcher.prepare(&call).unwrap();
        assert_eq!(request.body, None);
    }

    #[test]
    fn test_api_version_override() {
        let dispatcher = dispatcher(ScriptedTransport::default());
        let call = ApiCall::get("pairs", RequestParams::new()).with_api_version("v2");
        let request = dispatcher.prepare(&call).unwrap();
        assert_eq!(request.url, "https://pro-api.nexo.io/api/v2/pairs");
    }

    #[test]
    fn test_dispatch_blocking_classifies_response() {
        let dispatcher = dispatcher(ScriptedTransport::replying(200, r#"{"pairs":[]}"#));
        let payload = dispatcher
            .dispatch_blocking(ApiCall::get("pairs", RequestParams::new()))
            .unwrap();
        assert_eq!(payload, serde_json::json!({"pairs": []}));
        assert_eq!(dispatcher.transport().sent().len(), 1);

        let dispatcher = dispatcher_with_error();
        let err = dispatcher
            .dispatch_blocking(ApiCall::get("pairs", RequestParams::new()))
            .unwrap_err();
        assert_eq!(err.api_error().map(|e| e.code()), Some(103));
    }

    fn dispatcher_with_error() -> Dispatcher<ScriptedTransport> {
        dispatcher(ScriptedTransport::replying(
            403,
            r#"{"errorCode":103,"errorMessage":"Unauthorized"}"#,
        ))
    }

    #[test]
    fn test_transport_failure_is_surfaced_once() {
        let dispatcher = dispatcher(ScriptedTransport::default());
        let err = dispatcher
            .dispatch_blocking(ApiCall::get("pairs", RequestParams::new()))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Request);
        assert_eq!(dispatcher.transport().sent().len(), 1);
        let message = err.to_string();
        assert!(message.contains("GET https://pro-api.nexo.io/api/v1/pairs"));
        assert!(!message.contains("T+LOEv1r7F4GSLI7"));
    }

    #[test]
    fn test_build_requires_signer() {
        let err = DispatcherBuilder::new(RestClientConfig::default())
            .build(ScriptedTransport::default())
            .unwrap_err();
        assert!(matches!(err, NexoError::Credentials(_)));
    }
}
