use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A string did not name any variant of a wire enum
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("got '{value}', must be one of: {}", .expected.join(", "))]
pub struct ParseEnumError {
    pub value: String,
    pub expected: &'static [&'static str],
}

/// Declares a closed set of string values the API accepts for one field.
///
/// Each enum gets `as_str`, `Display`, `AsRef<str>` and a `FromStr` that
/// only accepts the exact wire spelling.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($wire),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(ParseEnumError {
                        value: other.to_string(),
                        expected: Self::VALUES,
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Order side
    Side { Buy => "buy", Sell => "sell" }
}

wire_enum! {
    /// Spot order type
    OrderType { Market => "market", Limit => "limit" }
}

wire_enum! {
    /// Trigger order flavour
    TriggerType {
        StopLoss => "stopLoss",
        TakeProfit => "takeProfit",
        Trailing => "trailing",
    }
}

wire_enum! {
    /// Whether a futures order opens or closes a position
    PositionAction { Open => "open", Close => "close" }
}

wire_enum! {
    PositionSide { Long => "long", Short => "short" }
}

wire_enum! {
    /// Filter for the futures positions listing
    PositionStatus { Any => "any", Active => "active", Inactive => "inactive" }
}

wire_enum! {
    /// Futures orders only support market execution
    FuturesOrderType { Market => "market" }
}

const ASSET_MIN_LEN: usize = 2;
const ASSET_MAX_LEN: usize = 6;

/// A segment must open with at least two uppercase ASCII letters and be at
/// most six bytes long. Bytes after the leading letters are not checked.
fn is_asset_code(segment: &str) -> bool {
    segment.len() <= ASSET_MAX_LEN
        && segment
            .bytes()
            .take(ASSET_MIN_LEN)
            .filter(u8::is_ascii_uppercase)
            .count()
            == ASSET_MIN_LEN
}

/// Check that `pair` has the `BASE/QUOTE` shape the exchange accepts.
///
/// Exactly one `/`; each side starts with two uppercase ASCII letters and is
/// at most six bytes long. Never panics.
pub fn validate_pair(pair: &str) -> bool {
    let mut segments = pair.split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(base), Some(quote), None) => is_asset_code(base) && is_asset_code(quote),
        _ => false,
    }
}

/// A trading pair that passed [`validate_pair`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TradingPair {
    base: String,
    quote: String,
}

impl TradingPair {
    pub fn parse(pair: &str) -> Result<Self, ParsePairError> {
        if !validate_pair(pair) {
            return Err(ParsePairError {
                pair: pair.to_string(),
            });
        }

        // validate_pair guarantees exactly one separator
        let (base, quote) = pair.split_once('/').ok_or_else(|| ParsePairError {
            pair: pair.to_string(),
        })?;

        Ok(Self {
            base: base.to_string(),
            quote: quote.to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for TradingPair {
    type Err = ParsePairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("got '{pair}', must be of format [A-Z]{{2,6}}/[A-Z]{{2,6}}")]
pub struct ParsePairError {
    pub pair: String,
}
