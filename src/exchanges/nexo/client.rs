use crate::core::config::NexoConfig;
use crate::core::errors::NexoError;
use crate::core::kernel::{AsyncTransport, Dispatcher, ReqwestTransport};
use crate::exchanges::nexo::builder::NexoClientBuilder;
use crate::exchanges::nexo::endpoints;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Async Nexo Pro client.
///
/// Cheap to clone; clones share one HTTP connection pool and one nonce
/// source. Every method validates its arguments before anything is signed.
pub struct NexoClient<T = ReqwestTransport> {
    dispatcher: Arc<Dispatcher<T>>,
}

impl<T> Clone for NexoClient<T> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

impl<T> std::fmt::Debug for NexoClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NexoClient")
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl NexoClient {
    pub fn new(config: NexoConfig) -> Result<Self, NexoError> {
        NexoClientBuilder::new(config).build()
    }
}

impl<T> NexoClient<T> {
    pub fn from_dispatcher(dispatcher: Dispatcher<T>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    /// Shift future nonces by `offset_ms` to compensate for clock drift.
    /// Applies to every clone of this client.
    pub fn set_timestamp_offset(&self, offset_ms: i64) {
        self.dispatcher.nonces().set_offset(offset_ms);
    }

    pub fn timestamp_offset(&self) -> i64 {
        self.dispatcher.nonces().offset()
    }

    /// Release this handle. The connection pool closes once the last clone
    /// is gone.
    pub fn close(self) {
        debug!(
            handles = Arc::strong_count(&self.dispatcher),
            "Closing Nexo client handle"
        );
    }
}

impl<T: AsyncTransport> NexoClient<T> {
    #[instrument(skip(self))]
    pub async fn get_account_balances(&self) -> Result<Value, NexoError> {
        self.dispatcher.dispatch(endpoints::account_balances()).await
    }

    #[instrument(skip(self))]
    pub async fn get_pairs(&self) -> Result<Value, NexoError> {
        self.dispatcher.dispatch(endpoints::pairs()).await
    }

    /// Quote `amount` of `pair`. An empty `exchanges` lets Nexo pick venues.
    #[instrument(skip_all, fields(pair = %pair, amount = %amount))]
    pub async fn get_price_quote<S: AsRef<str>>(
        &self,
        pair: &str,
        amount: Decimal,
        side: impl AsRef<str>,
        exchanges: &[S],
    ) -> Result<Value, NexoError> {
        let call = endpoints::price_quote(pair, amount, side, exchanges)?;
        self.dispatcher.dispatch(call).await
    }

    #[instrument(skip_all, fields(pairs = pairs.len(), page_num = page_num))]
    pub async fn get_order_history<S: AsRef<str>>(
        &self,
        pairs: &[S],
        start_date: i64,
        end_date: i64,
        page_size: u32,
        page_num: u32,
    ) -> Result<Value, NexoError> {
        let call = endpoints::order_history(pairs, start_date, end_date, page_size, page_num)?;
        self.dispatcher.dispatch(call).await
    }

    #[instrument(skip(self))]
    pub async fn get_order_details(&self, id: &str) -> Result<Value, NexoError> {
        let call = endpoints::order_details(id)?;
        self.dispatcher.dispatch(call).await
    }

    #[instrument(skip_all, fields(pairs = pairs.len(), page_num = page_num))]
    pub async fn get_trade_history<S: AsRef<str>>(
        &self,
        pairs: &[S],
        start_date: i64,
        end_date: i64,
        page_size: u32,
        page_num: u32,
    ) -> Result<Value, NexoError> {
        let call = endpoints::trade_history(pairs, start_date, end_date, page_size, page_num)?;
        self.dispatcher.dispatch(call).await
    }

    #[instrument(skip(self))]
    pub async fn get_transaction_info(&self, transaction_id: &str) -> Result<Value, NexoError> {
        let call = endpoints::transaction_info(transaction_id)?;
        self.dispatcher.dispatch(call).await
    }

    #[instrument(skip_all, fields(pair = %pair, quantity = %quantity))]
    pub async fn place_order(
        &self,
        pair: &str,
        side: impl AsRef<str>,
        order_type: impl AsRef<str>,
        quantity: Decimal,
        price: Option<Decimal>,
    ) -> Result<Value, NexoError> {
        let call = endpoints::place_order(pair, side, order_type, quantity, price)?;
        self.dispatcher.dispatch(call).await
    }

    #[allow(clippy::too_many_arguments)]
    #[instrument(skip_all, fields(pair = %pair, amount = %amount))]
    pub async fn place_trigger_order(
        &self,
        pair: &str,
        side: impl AsRef<str>,
        trigger_type: impl AsRef<str>,
        amount: Decimal,
        trigger_price: Decimal,
        trailing_distance: Option<Decimal>,
        trailing_percentage: Option<Decimal>,
    ) -> Result<Value, NexoError> {
        let call = endpoints::place_trigger_order(
            pair,
            side,
            trigger_type,
            amount,
            trigger_price,
            trailing_distance,
            trailing_percentage,
        )?;
        self.dispatcher.dispatch(call).await
    }

    #[instrument(skip_all, fields(pair = %pair, amount = %amount))]
    pub async fn place_advanced_order(
        &self,
        pair: &str,
        side: impl AsRef<str>,
        amount: Decimal,
        stop_loss_price: Decimal,
        take_profit_price: Decimal,
    ) -> Result<Value, NexoError> {
        let call = endpoints::place_advanced_order(
            pair,
            side,
            amount,
            stop_loss_price,
            take_profit_price,
        )?;
        self.dispatcher.dispatch(call).await
    }

    #[instrument(skip_all, fields(pair = %pair, quantity = %quantity, splits = splits))]
    pub async fn place_twap_order<S: AsRef<str>>(
        &self,
        pair: &str,
        side: impl AsRef<str>,
        quantity: Decimal,
        splits: u32,
        execution_interval: u32,
        exchanges: &[S],
    ) -> Result<Value, NexoError> {
        let call = endpoints::place_twap_order(
            pair,
            side,
            quantity,
            splits,
            execution_interval,
            exchanges,
        )?;
        self.dispatcher.dispatch(call).await
    }

    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: &str) -> Result<Value, NexoError> {
        let call = endpoints::cancel_order(order_id)?;
        self.dispatcher.dispatch(call).await
    }

    #[instrument(skip(self))]
    pub async fn cancel_all_orders(&self, pair: &str) -> Result<Value, NexoError> {
        let call = endpoints::cancel_all_orders(pair)?;
        self.dispatcher.dispatch(call).await
    }

    #[instrument(skip(self))]
    pub async fn get_all_future_instruments(&self) -> Result<Value, NexoError> {
        self.dispatcher
            .dispatch(endpoints::future_instruments())
            .await
    }

    #[instrument(skip_all)]
    pub async fn get_future_positions(&self, status: impl AsRef<str>) -> Result<Value, NexoError> {
        let call = endpoints::future_positions(status)?;
        self.dispatcher.dispatch(call).await
    }

    #[instrument(skip_all, fields(instrument = %instrument, quantity = %quantity))]
    pub async fn place_future_order(
        &self,
        instrument: &str,
        position_action: impl AsRef<str>,
        position_side: impl AsRef<str>,
        order_type: impl AsRef<str>,
        quantity: Decimal,
    ) -> Result<Value, NexoError> {
        let call = endpoints::place_future_order(
            instrument,
            position_action,
            position_side,
            order_type,
            quantity,
        )?;
        self.dispatcher.dispatch(call).await
    }

    #[instrument(skip(self))]
    pub async fn close_all_future_positions(&self) -> Result<Value, NexoError> {
        self.dispatcher
            .dispatch(endpoints::close_all_future_positions())
            .await
    }
}
