use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Currency;

/// Side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Bid,
    Ask,
}

impl Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Bid => f.write_str("bid"),
            OrderSide::Ask => f.write_str("ask"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

impl Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Limit => f.write_str("limit"),
            OrderType::Market => f.write_str("market"),
        }
    }
}

/// Market kind passed as `--markettype`. The gateway only trades spot markets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    #[default]
    Spot,
}

impl Display for MarketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketType::Spot => f.write_str("spot"),
        }
    }
}

/// A trading pair, `base` is the traded token and `quote` the one prices are expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Market {
    pub base: String,
    pub quote: String,
    #[serde(default)]
    pub market_type: MarketType,
}

impl Market {
    pub fn spot(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
            market_type: MarketType::Spot,
        }
    }
}

impl Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Order as submitted through `trusted place_order`.
///
/// Both `quantity` and `price` are raw fixed-point values (see [`crate::PRECISION`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub market: Market,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Currency,
    pub price: Currency,
}

impl Order {
    pub fn limit(market: Market, side: OrderSide, quantity: Currency, price: Currency) -> Self {
        Self {
            market,
            side,
            order_type: OrderType::Limit,
            quantity,
            price,
        }
    }
}

/// Identifier the worker assigns to a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    /// Decode the output of `trusted place_order`, the client prints the id as a JSON-ish
    /// string so a single layer of surrounding quotes is dropped.
    pub fn from_output(output: &str) -> Self {
        let trimmed = output.trim();
        let unquoted = trimmed
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(trimmed);
        Self(unquoted.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
