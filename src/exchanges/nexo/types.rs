use crate::core::errors::{NexoError, RequestError};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Amounts, prices and timestamps arrive as strings or numbers depending on
/// the endpoint. Both are kept as their textual form.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}

/// Typed view over a raw response payload.
///
/// Known fields are copied, unknown ones ignored, missing ones left as
/// `None`. Only a known field with an incompatible shape is an error.
pub trait Projection: DeserializeOwned {
    const NAME: &'static str;

    fn project(value: &Value) -> Result<Self, NexoError> {
        Self::deserialize(value).map_err(|e| {
            RequestError::Projection {
                target: Self::NAME,
                message: e.to_string(),
            }
            .into()
        })
    }
}

macro_rules! projection {
    ($($name:ident),+ $(,)?) => {
        $(
            impl Projection for $name {
                const NAME: &'static str = stringify!($name);
            }
        )+
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WalletBalance {
    #[serde(deserialize_with = "lenient_string")]
    pub asset_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub total_balance: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub available_balance: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub locked_balance: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub debt: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub interest: Option<String>,
}

/// `GET accountSummary`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Balances {
    pub balances: Option<Vec<WalletBalance>>,
}

/// `GET pairs`. Limits are keyed by pair and kept as sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pairs {
    pub pairs: Option<Vec<String>>,
    pub min_limits: Option<BTreeMap<String, Value>>,
    pub max_limits: Option<BTreeMap<String, Value>>,
}

/// `GET quote`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quote {
    #[serde(deserialize_with = "lenient_string")]
    pub pair: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub amount: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub price: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
}

/// Market, limit and trigger order placement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(deserialize_with = "lenient_string")]
    pub order_id: Option<String>,
}

/// TWAP and advanced order placement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdvancedOrderResponse {
    #[serde(deserialize_with = "lenient_string")]
    pub order_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub amount: Option<String>,
}

/// One fill inside [`OrderDetails`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TradeForOrder {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub symbol: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub trade_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub order_amount: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub amount_filled: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub executed_price: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub status: Option<String>,
}

/// `GET orderDetails`, also the element type of [`Orders`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub side: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub pair: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub quantity: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub exchange_rate: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub exchange_quantity: Option<String>,
    pub trades: Option<Vec<TradeForOrder>>,
}

/// `GET orders`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Orders {
    pub orders: Option<Vec<OrderDetails>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Trade {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub symbol: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub side: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub trade_amount: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub executed_price: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub order_id: Option<String>,
}

/// `GET trades`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeHistory {
    pub trades: Option<Vec<Trade>>,
}

/// `GET transaction`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transaction {
    #[serde(deserialize_with = "lenient_string")]
    pub transaction_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub create_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub asset_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub amount: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub transaction_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub status: Option<String>,
}

projection!(
    WalletBalance,
    Balances,
    Pairs,
    Quote,
    OrderResponse,
    AdvancedOrderResponse,
    TradeForOrder,
    OrderDetails,
    Orders,
    Trade,
    TradeHistory,
    Transaction,
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_balances() {
        let balances = Balances::project(&json!({
            "balances": [{
                "assetName": "XRP",
                "totalBalance": "100.0",
                "availableBalance": "2.0",
                "lockedBalance": "0.3",
                "interest": "0.4"
            }]
        }))
        .unwrap();

        let balances = balances.balances.unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].asset_name.as_deref(), Some("XRP"));
        assert_eq!(balances[0].total_balance.as_deref(), Some("100.0"));
        assert_eq!(balances[0].locked_balance.as_deref(), Some("0.3"));
        assert_eq!(balances[0].debt, None);
    }

    #[test]
    fn test_pairs() {
        let pairs = Pairs::project(&json!({
            "pairs": ["BNB/USDT", "MKR/BTC"],
            "minLimits": {"BNB/USDT": 0.355, "MKR_BTC": 0.002},
            "maxLimits": {"BNB/USDT": 3435.5, "MKR_BTC": 42.4}
        }))
        .unwrap();

        assert_eq!(
            pairs.pairs,
            Some(vec!["BNB/USDT".to_string(), "MKR/BTC".to_string()])
        );
        let min_limits = pairs.min_limits.unwrap();
        assert_eq!(min_limits["BNB/USDT"], json!(0.355));
        assert_eq!(pairs.max_limits.unwrap()["MKR_BTC"], json!(42.4));
    }

    #[test]
    fn test_snake_case_keys_are_not_recognised() {
        let pairs = Pairs::project(&json!({
            "pairs": ["BNB/USDT"],
            "min_limits": {"BNB/USDT": 0.355}
        }))
        .unwrap();
        assert_eq!(pairs.min_limits, None);
    }

    #[test]
    fn test_quote_accepts_strings_and_numbers() {
        let quote = Quote::project(&json!({
            "pair": "BNB/USDT",
            "amount": "1000.0",
            "price": 10.5,
            "timestamp": 123424243
        }))
        .unwrap();

        assert_eq!(quote.pair.as_deref(), Some("BNB/USDT"));
        assert_eq!(quote.amount.as_deref(), Some("1000.0"));
        assert_eq!(quote.price.as_deref(), Some("10.5"));
        assert_eq!(quote.timestamp.as_deref(), Some("123424243"));
    }

    #[test]
    fn test_order_details_with_trades() {
        let details = OrderDetails::project(&json!({
            "id": "abc",
            "side": "buy",
            "pair": "BTC/USDT",
            "quantity": "0.5",
            "exchangeRate": "30000",
            "trades": [{
                "id": "t1",
                "symbol": "BTC/USDT",
                "type": "market",
                "orderAmount": "0.5",
                "amountFilled": "0.5",
                "executedPrice": "30000",
                "status": "completed"
            }],
            "somethingNew": true
        }))
        .unwrap();

        assert_eq!(details.exchange_rate.as_deref(), Some("30000"));
        assert_eq!(details.exchange_quantity, None);
        let trades = details.trades.unwrap();
        assert_eq!(trades[0].trade_type.as_deref(), Some("market"));
        assert_eq!(trades[0].amount_filled.as_deref(), Some("0.5"));
    }

    #[test]
    fn test_orders_and_trade_history() {
        let orders = Orders::project(&json!({"orders": [{"id": "1"}, {"id": "2"}]})).unwrap();
        assert_eq!(orders.orders.map(|o| o.len()), Some(2));

        let history = TradeHistory::project(&json!({
            "trades": [{"id": "t", "tradeAmount": 1.25, "orderId": "o"}]
        }))
        .unwrap();
        let trade = &history.trades.unwrap()[0];
        assert_eq!(trade.trade_amount.as_deref(), Some("1.25"));
        assert_eq!(trade.order_id.as_deref(), Some("o"));
    }

    #[test]
    fn test_transaction_and_order_responses() {
        let tx = Transaction::project(&json!({
            "transactionId": "tx",
            "createDate": "2023-01-01",
            "type": "deposit",
            "amount": 12
        }))
        .unwrap();
        assert_eq!(tx.transaction_type.as_deref(), Some("deposit"));
        assert_eq!(tx.amount.as_deref(), Some("12"));

        let order = OrderResponse::project(&json!({"orderId": "o-1"})).unwrap();
        assert_eq!(order.order_id.as_deref(), Some("o-1"));

        let twap =
            AdvancedOrderResponse::project(&json!({"orderId": "o-2", "amount": "3"})).unwrap();
        assert_eq!(twap.amount.as_deref(), Some("3"));
    }

    #[test]
    fn test_empty_payload_projects_to_defaults() {
        assert_eq!(Balances::project(&json!({})).unwrap(), Balances::default());
        assert_eq!(Quote::project(&json!({"price": null})).unwrap(), Quote::default());
    }

    #[test]
    fn test_incompatible_shape_is_an_error() {
        let err = Balances::project(&json!({"balances": "none"})).unwrap_err();
        assert!(err.to_string().contains("Balances"));

        let err = Quote::project(&json!({"price": {"value": 1}})).unwrap_err();
        assert!(matches!(
            err,
            NexoError::Request(RequestError::Projection { target: "Quote", .. })
        ));
    }
}
