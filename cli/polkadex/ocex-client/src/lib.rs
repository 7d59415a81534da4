//! Typed front-end over the `substratee-client` executable.
//!
//! Every operation builds an argument list, runs the client as a subprocess and decodes
//! whatever it printed to stdout. No exchange logic lives here, the node and the worker
//! remain black boxes reachable only through the client's command-line protocol.

pub mod amount;
pub mod args;
pub mod clients;
mod error;
pub mod mrenclave;
pub mod runner;
mod types;

pub use crate::{
    amount::Amount,
    args::CommandArgs,
    clients::{Client, OcexClientExt, SystemClientExt, TrustedClientExt},
    error::Error,
    mrenclave::Mrenclave,
    runner::{ClientConfig, CommandRunner, SubprocessRunner},
    types::{Market, MarketType, Order, OrderId, OrderSide, OrderType},
};

/// Raw token amount, as printed and accepted by the client.
pub type Currency = u128;

/// Fixed-point scale of [`Currency`], one whole token is `PRECISION` raw units.
pub const PRECISION: Currency = 1_000_000_000_000_000_000;

/// Parse the client's textual balance output.
///
/// The client prints a single base-10 integer; anything else means the call went wrong
/// somewhere along the way.
pub fn parse_balance(output: &str) -> Result<Currency, Error> {
    let trimmed = output.trim();
    trimmed
        .parse::<Currency>()
        .map_err(|_| Error::InvalidBalance(trimmed.to_string()))
}
