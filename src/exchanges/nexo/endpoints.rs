//! Argument validation and request construction for every Nexo Pro operation.
//!
//! Each function either rejects its input with [`NexoError::Validation`] or
//! returns the [`ApiCall`] to dispatch. Nothing here touches the clock, the
//! signer or the network, so a rejected call never consumes a nonce.

use crate::core::errors::NexoError;
use crate::core::kernel::{ApiCall, RequestParams};
use crate::core::types::{
    FuturesOrderType, OrderType, ParseEnumError, PositionAction, PositionSide, PositionStatus,
    Side, TradingPair, TriggerType,
};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

pub const ACCOUNT_SUMMARY: &str = "accountSummary";
pub const PAIRS: &str = "pairs";
pub const QUOTE: &str = "quote";
pub const ORDERS: &str = "orders";
pub const ORDER_DETAILS: &str = "orderDetails";
pub const TRADES: &str = "trades";
pub const TRANSACTION: &str = "transaction";
pub const TWAP_ORDERS: &str = "orders/twap";
pub const CANCEL_ORDER: &str = "orders/cancel";
pub const CANCEL_ALL_ORDERS: &str = "orders/cancel/all";
pub const FUTURE_INSTRUMENTS: &str = "futures/instruments";
pub const FUTURE_POSITIONS: &str = "futures/positions";
pub const FUTURE_ORDER: &str = "futures/order";
pub const CLOSE_ALL_FUTURE_POSITIONS: &str = "futures/close-all-positions";

fn pair(field: &str, value: &str) -> Result<TradingPair, NexoError> {
    TradingPair::parse(value).map_err(|e| NexoError::validation(field, e.to_string()))
}

fn pair_list<S: AsRef<str>>(field: &str, values: &[S]) -> Result<Value, NexoError> {
    if values.is_empty() {
        return Err(NexoError::validation(field, "at least one pair is required"));
    }
    let pairs = values
        .iter()
        .map(|value| pair(field, value.as_ref()).map(|p| Value::String(p.to_string())))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(pairs))
}

fn choice<E>(field: &str, value: impl AsRef<str>) -> Result<E, NexoError>
where
    E: FromStr<Err = ParseEnumError>,
{
    value
        .as_ref()
        .parse()
        .map_err(|e: ParseEnumError| NexoError::validation(field, e.to_string()))
}

fn positive(field: &str, value: Decimal) -> Result<Decimal, NexoError> {
    if value > Decimal::ZERO {
        Ok(value)
    } else {
        Err(NexoError::validation(
            field,
            format!("must be greater than zero, got {}", value),
        ))
    }
}

fn identifier(field: &str, value: &str) -> Result<String, NexoError> {
    if value.trim().is_empty() {
        Err(NexoError::validation(field, "must not be empty"))
    } else {
        Ok(value.to_string())
    }
}

fn at_least_one(field: &str, value: u32) -> Result<u32, NexoError> {
    if value >= 1 {
        Ok(value)
    } else {
        Err(NexoError::validation(field, "must be at least 1"))
    }
}

/// Optional list of venue names; empty means "let the exchange choose"
fn exchange_list<S: AsRef<str>>(exchanges: &[S]) -> Result<Option<Value>, NexoError> {
    if exchanges.is_empty() {
        return Ok(None);
    }
    let names = exchanges
        .iter()
        .map(|name| identifier("exchanges", name.as_ref()).map(Value::String))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(Value::Array(names)))
}

/// Shared by order and trade history
fn history_params<S: AsRef<str>>(
    pairs: &[S],
    start_date: i64,
    end_date: i64,
    page_size: u32,
    page_num: u32,
) -> Result<RequestParams, NexoError> {
    let pairs = pair_list("pairs", pairs)?;
    if start_date > end_date {
        return Err(NexoError::validation(
            "startDate",
            format!("must not be after endDate ({} > {})", start_date, end_date),
        ));
    }
    let page_size = at_least_one("pageSize", page_size)?;

    Ok(RequestParams::new()
        .with("pairs", pairs)
        .with("startDate", start_date)
        .with("endDate", end_date)
        .with("pageSize", page_size)
        .with("pageNum", page_num))
}

pub fn account_balances() -> ApiCall {
    ApiCall::get(ACCOUNT_SUMMARY, RequestParams::new())
}

pub fn pairs() -> ApiCall {
    ApiCall::get(PAIRS, RequestParams::new())
}

pub fn price_quote<S: AsRef<str>>(
    pair_name: &str,
    amount: Decimal,
    side: impl AsRef<str>,
    exchanges: &[S],
) -> Result<ApiCall, NexoError> {
    let pair = pair("pair", pair_name)?;
    let side: Side = choice("side", side)?;
    let amount = positive("amount", amount)?;
    let exchanges = exchange_list(exchanges)?;

    let params = RequestParams::new()
        .with("pair", pair.to_string())
        .with_decimal("amount", amount)
        .with("side", side.as_str())
        .with_opt("exchanges", exchanges);
    Ok(ApiCall::get(QUOTE, params))
}

pub fn order_history<S: AsRef<str>>(
    pairs: &[S],
    start_date: i64,
    end_date: i64,
    page_size: u32,
    page_num: u32,
) -> Result<ApiCall, NexoError> {
    let params = history_params(pairs, start_date, end_date, page_size, page_num)?;
    Ok(ApiCall::get(ORDERS, params))
}

pub fn order_details(id: &str) -> Result<ApiCall, NexoError> {
    let id = identifier("id", id)?;
    Ok(ApiCall::get(ORDER_DETAILS, RequestParams::new().with("id", id)))
}

pub fn trade_history<S: AsRef<str>>(
    pairs: &[S],
    start_date: i64,
    end_date: i64,
    page_size: u32,
    page_num: u32,
) -> Result<ApiCall, NexoError> {
    let params = history_params(pairs, start_date, end_date, page_size, page_num)?;
    Ok(ApiCall::get(TRADES, params))
}

pub fn transaction_info(transaction_id: &str) -> Result<ApiCall, NexoError> {
    let transaction_id = identifier("transactionId", transaction_id)?;
    Ok(ApiCall::get(
        TRANSACTION,
        RequestParams::new().with("transactionId", transaction_id),
    ))
}

/// Market or limit order. Limit orders must carry a price.
pub fn place_order(
    pair_name: &str,
    side: impl AsRef<str>,
    order_type: impl AsRef<str>,
    quantity: Decimal,
    price: Option<Decimal>,
) -> Result<ApiCall, NexoError> {
    let pair = pair("pair", pair_name)?;
    let side: Side = choice("side", side)?;
    let order_type: OrderType = choice("type", order_type)?;
    let quantity = positive("quantity", quantity)?;
    let price = price.map(|p| positive("price", p)).transpose()?;

    if order_type == OrderType::Limit && price.is_none() {
        return Err(NexoError::validation("price", "is required for limit orders"));
    }

    let params = RequestParams::new()
        .with("pair", pair.to_string())
        .with("side", side.as_str())
        .with("type", order_type.as_str())
        .with_decimal("quantity", quantity)
        .with_opt_decimal("price", price);
    Ok(ApiCall::post(ORDERS, params))
}

pub fn place_trigger_order(
    pair_name: &str,
    side: impl AsRef<str>,
    trigger_type: impl AsRef<str>,
    amount: Decimal,
    trigger_price: Decimal,
    trailing_distance: Option<Decimal>,
    trailing_percentage: Option<Decimal>,
) -> Result<ApiCall, NexoError> {
    let pair = pair("pair", pair_name)?;
    let side: Side = choice("side", side)?;
    let trigger_type: TriggerType = choice("triggerType", trigger_type)?;
    let amount = positive("amount", amount)?;
    let trigger_price = positive("triggerPrice", trigger_price)?;
    let trailing_distance = trailing_distance
        .map(|d| positive("trailingDistance", d))
        .transpose()?;
    let trailing_percentage = trailing_percentage
        .map(|p| positive("trailingPercentage", p))
        .transpose()?;

    if trigger_type == TriggerType::Trailing
        && trailing_distance.is_none()
        && trailing_percentage.is_none()
    {
        return Err(NexoError::validation(
            "trailingDistance",
            "trailing orders need a trailing distance or percentage",
        ));
    }

    let params = RequestParams::new()
        .with("pair", pair.to_string())
        .with("side", side.as_str())
        .with("triggerType", trigger_type.as_str())
        .with_decimal("amount", amount)
        .with_decimal("triggerPrice", trigger_price)
        .with_opt_decimal("trailingDistance", trailing_distance)
        .with_opt_decimal("trailingPercentage", trailing_percentage);
    Ok(ApiCall::post(ORDERS, params))
}

pub fn place_advanced_order(
    pair_name: &str,
    side: impl AsRef<str>,
    amount: Decimal,
    stop_loss_price: Decimal,
    take_profit_price: Decimal,
) -> Result<ApiCall, NexoError> {
    let pair = pair("pair", pair_name)?;
    let side: Side = choice("side", side)?;
    let amount = positive("amount", amount)?;
    let stop_loss_price = positive("stopLossPrice", stop_loss_price)?;
    let take_profit_price = positive("takeProfitPrice", take_profit_price)?;

    let params = RequestParams::new()
        .with("pair", pair.to_string())
        .with("side", side.as_str())
        .with_decimal("amount", amount)
        .with_decimal("stopLossPrice", stop_loss_price)
        .with_decimal("takeProfitPrice", take_profit_price);
    Ok(ApiCall::post(ORDERS, params))
}

/// Time-weighted order executed in `splits` slices, `execution_interval` apart
pub fn place_twap_order<S: AsRef<str>>(
    pair_name: &str,
    side: impl AsRef<str>,
    quantity: Decimal,
    splits: u32,
    execution_interval: u32,
    exchanges: &[S],
) -> Result<ApiCall, NexoError> {
    let pair = pair("pair", pair_name)?;
    let side: Side = choice("side", side)?;
    let quantity = positive("quantity", quantity)?;
    let splits = at_least_one("splits", splits)?;
    let execution_interval = at_least_one("executionInterval", execution_interval)?;
    let exchanges = exchange_list(exchanges)?;

    let params = RequestParams::new()
        .with("pair", pair.to_string())
        .with("side", side.as_str())
        .with_decimal("quantity", quantity)
        .with("splits", splits)
        .with("executionInterval", execution_interval)
        .with_opt("exchanges", exchanges);
    Ok(ApiCall::post(TWAP_ORDERS, params))
}

pub fn cancel_order(order_id: &str) -> Result<ApiCall, NexoError> {
    let order_id = identifier("orderId", order_id)?;
    Ok(ApiCall::post(
        CANCEL_ORDER,
        RequestParams::new().with("orderId", order_id),
    ))
}

pub fn cancel_all_orders(pair_name: &str) -> Result<ApiCall, NexoError> {
    let pair = pair("pair", pair_name)?;
    Ok(ApiCall::post(
        CANCEL_ALL_ORDERS,
        RequestParams::new().with("pair", pair.to_string()),
    ))
}

pub fn future_instruments() -> ApiCall {
    ApiCall::get(FUTURE_INSTRUMENTS, RequestParams::new())
}

pub fn future_positions(status: impl AsRef<str>) -> Result<ApiCall, NexoError> {
    let status: PositionStatus = choice("status", status)?;
    Ok(ApiCall::get(
        FUTURE_POSITIONS,
        RequestParams::new().with("status", status.as_str()),
    ))
}

pub fn place_future_order(
    instrument: &str,
    position_action: impl AsRef<str>,
    position_side: impl AsRef<str>,
    order_type: impl AsRef<str>,
    quantity: Decimal,
) -> Result<ApiCall, NexoError> {
    let instrument = identifier("instrument", instrument)?;
    let position_action: PositionAction = choice("positionAction", position_action)?;
    let position_side: PositionSide = choice("positionSide", position_side)?;
    let order_type: FuturesOrderType = choice("type", order_type)?;
    let quantity = positive("quantity", quantity)?;

    let params = RequestParams::new()
        .with("instrument", instrument)
        .with("positionAction", position_action.as_str())
        .with("positionSide", position_side.as_str())
        .with("type", order_type.as_str())
        .with_decimal("quantity", quantity);
    Ok(ApiCall::post(FUTURE_ORDER, params))
}

pub fn close_all_future_positions() -> ApiCall {
    ApiCall::post(CLOSE_ALL_FUTURE_POSITIONS, RequestParams::new())
}
