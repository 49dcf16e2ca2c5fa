use crate::core::config::NexoConfig;
use crate::core::errors::NexoError;
use crate::core::kernel::{BlockingReqwestTransport, BlockingTransport, Dispatcher};
use crate::exchanges::nexo::builder::NexoClientBuilder;
use crate::exchanges::nexo::endpoints;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, instrument};

/// Blocking Nexo Pro client; each call occupies the calling thread until the
/// response is classified.
///
/// Do not create or use it from inside an async runtime; use
/// [`NexoClient`](crate::exchanges::nexo::NexoClient) there.
#[derive(Debug)]
pub struct BlockingNexoClient<T = BlockingReqwestTransport> {
    dispatcher: Dispatcher<T>,
}

impl BlockingNexoClient {
    pub fn new(config: NexoConfig) -> Result<Self, NexoError> {
        NexoClientBuilder::new(config).build_blocking()
    }
}

impl<T> BlockingNexoClient<T> {
    pub fn from_dispatcher(dispatcher: Dispatcher<T>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    pub fn set_timestamp_offset(&self, offset_ms: i64) {
        self.dispatcher.nonces().set_offset(offset_ms);
    }

    pub fn timestamp_offset(&self) -> i64 {
        self.dispatcher.nonces().offset()
    }

    /// Release the client and its connection pool
    pub fn close(self) {
        debug!("Closing blocking Nexo client");
    }
}

impl<T: BlockingTransport> BlockingNexoClient<T> {
    #[instrument(skip(self))]
    pub fn get_account_balances(&self) -> Result<Value, NexoError> {
        self.dispatcher
            .dispatch_blocking(endpoints::account_balances())
    }

    #[instrument(skip(self))]
    pub fn get_pairs(&self) -> Result<Value, NexoError> {
        self.dispatcher.dispatch_blocking(endpoints::pairs())
    }

    #[instrument(skip_all, fields(pair = %pair, amount = %amount))]
    pub fn get_price_quote<S: AsRef<str>>(
        &self,
        pair: &str,
        amount: Decimal,
        side: impl AsRef<str>,
        exchanges: &[S],
    ) -> Result<Value, NexoError> {
        let call = endpoints::price_quote(pair, amount, side, exchanges)?;
        self.dispatcher.dispatch_blocking(call)
    }

    #[instrument(skip_all, fields(pairs = pairs.len(), page_num = page_num))]
    pub fn get_order_history<S: AsRef<str>>(
        &self,
        pairs: &[S],
        start_date: i64,
        end_date: i64,
        page_size: u32,
        page_num: u32,
    ) -> Result<Value, NexoError> {
        let call = endpoints::order_history(pairs, start_date, end_date, page_size, page_num)?;
        self.dispatcher.dispatch_blocking(call)
    }

    #[instrument(skip(self))]
    pub fn get_order_details(&self, id: &str) -> Result<Value, NexoError> {
        let call = endpoints::order_details(id)?;
        self.dispatcher.dispatch_blocking(call)
    }

    #[instrument(skip_all, fields(pairs = pairs.len(), page_num = page_num))]
    pub fn get_trade_history<S: AsRef<str>>(
        &self,
        pairs: &[S],
        start_date: i64,
        end_date: i64,
        page_size: u32,
        page_num: u32,
    ) -> Result<Value, NexoError> {
        let call = endpoints::trade_history(pairs, start_date, end_date, page_size, page_num)?;
        self.dispatcher.dispatch_blocking(call)
    }

    #[instrument(skip(self))]
    pub fn get_transaction_info(&self, transaction_id: &str) -> Result<Value, NexoError> {
        let call = endpoints::transaction_info(transaction_id)?;
        self.dispatcher.dispatch_blocking(call)
    }

    #[instrument(skip_all, fields(pair = %pair, quantity = %quantity))]
    pub fn place_order(
        &self,
        pair: &str,
        side: impl AsRef<str>,
        order_type: impl AsRef<str>,
        quantity: Decimal,
        price: Option<Decimal>,
    ) -> Result<Value, NexoError> {
        let call = endpoints::place_order(pair, side, order_type, quantity, price)?;
        self.dispatcher.dispatch_blocking(call)
    }

    #[allow(clippy::too_many_arguments)]
    #[instrument(skip_all, fields(pair = %pair, amount = %amount))]
    pub fn place_trigger_order(
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
        self.dispatcher.dispatch_blocking(call)
    }

    #[instrument(skip_all, fields(pair = %pair, amount = %amount))]
    pub fn place_advanced_order(
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
        self.dispatcher.dispatch_blocking(call)
    }

    #[instrument(skip_all, fields(pair = %pair, quantity = %quantity, splits = splits))]
    pub fn place_twap_order<S: AsRef<str>>(
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
        self.dispatcher.dispatch_blocking(call)
    }

    #[instrument(skip(self))]
    pub fn cancel_order(&self, order_id: &str) -> Result<Value, NexoError> {
        let call = endpoints::cancel_order(order_id)?;
        self.dispatcher.dispatch_blocking(call)
    }

    #[instrument(skip(self))]
    pub fn cancel_all_orders(&self, pair: &str) -> Result<Value, NexoError> {
        let call = endpoints::cancel_all_orders(pair)?;
        self.dispatcher.dispatch_blocking(call)
    }

    #[instrument(skip(self))]
    pub fn get_all_future_instruments(&self) -> Result<Value, NexoError> {
        self.dispatcher
            .dispatch_blocking(endpoints::future_instruments())
    }

    #[instrument(skip_all)]
    pub fn get_future_positions(&self, status: impl AsRef<str>) -> Result<Value, NexoError> {
        let call = endpoints::future_positions(status)?;
        self.dispatcher.dispatch_blocking(call)
    }

    #[instrument(skip_all, fields(instrument = %instrument, quantity = %quantity))]
    pub fn place_future_order(
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
        self.dispatcher.dispatch_blocking(call)
    }

    #[instrument(skip(self))]
    pub fn close_all_future_positions(&self) -> Result<Value, NexoError> {
        self.dispatcher
            .dispatch_blocking(endpoints::close_all_future_positions())
    }
}
