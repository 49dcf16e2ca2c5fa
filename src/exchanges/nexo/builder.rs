use crate::core::config::NexoConfig;
use crate::core::errors::NexoError;
use crate::core::kernel::{
    system_clock, AsyncTransport, BlockingReqwestTransport, BlockingTransport, Clock, Dispatcher,
    DispatcherBuilder, HmacSigner, NonceSource, ReqwestTransport,
};
use crate::exchanges::nexo::blocking::BlockingNexoClient;
use crate::exchanges::nexo::client::NexoClient;
use std::sync::Arc;

/// Assembles Nexo Pro clients from a [`NexoConfig`].
///
/// The clock is injectable so tests can pin the nonce and therefore the
/// signature.
pub struct NexoClientBuilder {
    config: NexoConfig,
    clock: Option<Clock>,
}

impl NexoClientBuilder {
    pub fn new(config: NexoConfig) -> Self {
        Self {
            config,
            clock: None,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    fn dispatcher<T>(self, transport: T) -> Result<Dispatcher<T>, NexoError> {
        let signer = HmacSigner::new(
            self.config.api_key.clone(),
            self.config.api_secret.clone(),
            self.config.signature_mode,
        )?;
        let nonces = NonceSource::new(self.clock.unwrap_or_else(system_clock))
            .with_offset(self.config.timestamp_offset);

        DispatcherBuilder::new(self.config.rest_config())
            .with_signer(Arc::new(signer))
            .with_nonce_source(Arc::new(nonces))
            .build(transport)
    }

    /// Async client over a pooled `reqwest::Client`
    pub fn build(self) -> Result<NexoClient, NexoError> {
        let transport = ReqwestTransport::new(&self.config.rest_config())?;
        self.build_with_transport(transport)
    }

    pub fn build_with_transport<T: AsyncTransport>(
        self,
        transport: T,
    ) -> Result<NexoClient<T>, NexoError> {
        Ok(NexoClient::from_dispatcher(self.dispatcher(transport)?))
    }

    /// Blocking client over a pooled `reqwest::blocking::Client`
    pub fn build_blocking(self) -> Result<BlockingNexoClient, NexoError> {
        let transport = BlockingReqwestTransport::new(&self.config.rest_config())?;
        self.build_blocking_with_transport(transport)
    }

    pub fn build_blocking_with_transport<T: BlockingTransport>(
        self,
        transport: T,
    ) -> Result<BlockingNexoClient<T>, NexoError> {
        Ok(BlockingNexoClient::from_dispatcher(
            self.dispatcher(transport)?,
        ))
    }
}

/// Create an async Nexo Pro client
pub fn build_client(config: NexoConfig) -> Result<NexoClient, NexoError> {
    NexoClientBuilder::new(config).build()
}

/// Create a blocking Nexo Pro client
pub fn build_blocking_client(config: NexoConfig) -> Result<BlockingNexoClient, NexoError> {
    NexoClientBuilder::new(config).build_blocking()
}
