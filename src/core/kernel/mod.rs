//! Transport kernel for the Nexo Pro REST API
//!
//! Everything between a validated [`ApiCall`] and a classified JSON payload:
//!
//! - [`params`]: canonical ordering and encoding of request parameters
//! - [`nonce`]: monotonic millisecond nonces with a settable drift offset
//! - [`signer`]: HMAC-SHA256 request signing behind the [`Signer`] trait
//! - [`rest`]: request preparation, the [`Dispatcher`] and its transports
//! - [`classify`](mod@classify): mapping of status and body to a payload or a typed error
//!
//! The dispatcher is generic over its transport. Both execution modes share
//! one preparation path and one classification path:
//!
//! ```rust,no_run
//! use nexo_pro::core::kernel::*;
//! use secrecy::Secret;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), nexo_pro::core::errors::NexoError> {
//! let config = RestClientConfig::new(DEFAULT_BASE_URL);
//! let signer = HmacSigner::new(
//!     Secret::new("api_key".to_string()),
//!     Secret::new("api_secret".to_string()),
//!     SignatureMode::default(),
//! )?;
//! let transport = ReqwestTransport::new(&config)?;
//! let dispatcher = DispatcherBuilder::new(config)
//!     .with_signer(Arc::new(signer))
//!     .build(transport)?;
//!
//! let pairs = dispatcher
//!     .dispatch(ApiCall::get("pairs", RequestParams::new()))
//!     .await?;
//! println!("{pairs}");
//! # Ok(())
//! # }
//! ```
pub mod classify;
pub mod nonce;
pub mod params;
pub mod rest;
pub mod signer;

pub use classify::classify;
pub use nonce::{system_clock, system_clock_ms, Clock, NonceSource};
pub use params::{canonicalize, RequestParams};
pub use rest::{
    ApiCall, AsyncTransport, BlockingReqwestTransport, BlockingTransport, Dispatcher,
    DispatcherBuilder, PreparedRequest, RawResponse, ReqwestTransport, RestClientConfig,
    DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
pub use signer::{
    sign, HmacSigner, SignatureEncoding, SignatureMode, SignaturePayload, SignatureResult,
    Signer, HEADER_API_KEY, HEADER_NONCE, HEADER_SIGNATURE,
};
