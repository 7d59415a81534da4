//! Argument lists understood by `substratee-client`.
//!
//! Flags are always emitted in the `--name=value` form, the client does not accept
//! `--name value` for the trusted subcommands.

use std::fmt::Display;

use crate::{Currency, Market, Mrenclave, Order, OrderId};

pub const ACCOUNT_ID: &str = "accountid";
pub const PROXY_ACCOUNT_ID: &str = "proxyaccountid";
pub const TOKEN_ID: &str = "tokenid";
pub const QUANTITY: &str = "quantity";
pub const PRICE: &str = "price";
pub const MARKET_BASE: &str = "marketbase";
pub const MARKET_QUOTE: &str = "marketquote";
pub const MARKET_TYPE: &str = "markettype";
pub const ORDER_SIDE: &str = "orderside";
pub const ORDER_TYPE: &str = "ordertype";
pub const ORDER_ID: &str = "orderid";
pub const MRENCLAVE: &str = "mrenclave";
pub const DIRECT: &str = "direct";

/// Ordered argument list for a single client invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs(Vec<String>);

impl CommandArgs {
    /// Start a new argument list with the given (possibly nested) subcommand.
    pub fn subcommand<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(words.into_iter().map(Into::into).collect())
    }

    pub fn positional(mut self, value: impl Into<String>) -> Self {
        self.0.push(value.into());
        self
    }

    pub fn flag(mut self, name: &str, value: impl Display) -> Self {
        self.0.push(format!("--{name}={value}"));
        self
    }

    pub fn switch(mut self, name: &str) -> Self {
        self.0.push(format!("--{name}"));
        self
    }

    /// `--accountid`, followed by `--proxyaccountid` only if a proxy is present.
    pub fn account(self, account: &str, proxy: Option<&str>) -> Self {
        let args = self.flag(ACCOUNT_ID, account);
        match proxy {
            Some(proxy) => args.flag(PROXY_ACCOUNT_ID, proxy),
            None => args,
        }
    }

    pub fn token(self, token: &str) -> Self {
        self.flag(TOKEN_ID, token)
    }

    pub fn quantity(self, quantity: Currency) -> Self {
        self.flag(QUANTITY, quantity)
    }

    pub fn price(self, price: Currency) -> Self {
        self.flag(PRICE, price)
    }

    pub fn market(self, market: &Market) -> Self {
        self.flag(MARKET_BASE, &market.base)
            .flag(MARKET_QUOTE, &market.quote)
            .flag(MARKET_TYPE, market.market_type)
    }

    pub fn order(self, order: &Order) -> Self {
        self.market(&order.market)
            .quantity(order.quantity)
            .flag(ORDER_SIDE, order.side)
            .flag(ORDER_TYPE, order.order_type)
            .price(order.price)
    }

    pub fn order_id(self, order_id: &OrderId) -> Self {
        self.flag(ORDER_ID, order_id)
    }

    /// Address the call directly to the worker running `mrenclave`.
    pub fn direct(self, mrenclave: &Mrenclave) -> Self {
        self.flag(MRENCLAVE, mrenclave).switch(DIRECT)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl Display for CommandArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}
