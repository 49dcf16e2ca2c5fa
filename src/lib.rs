pub mod core;
pub mod exchanges;

pub use crate::core::config::NexoConfig;
pub use crate::core::errors::{ApiError, ApiErrorCode, ErrorKind, NexoError, RequestError};
pub use crate::core::types::*;
pub use crate::exchanges::nexo::{BlockingNexoClient, NexoClient, NexoClientBuilder, Projection};
