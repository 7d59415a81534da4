//! End-to-end trading scenarios driven through `substratee-client`.
//!
//! Every scenario is a fixed script: it registers accounts, moves funds between the chain and
//! the worker, places orders and compares the resulting balances against literal expectations.
//! The first mismatch aborts the scenario.

mod error;
pub mod report;
pub mod scenarios;
mod session;
pub mod snapshot;
pub mod testnet;

use std::fmt::Display;

use ocex_client::{Currency, PRECISION};
use serde::{Deserialize, Serialize};

pub use crate::{
    error::ScenarioError,
    report::{BalanceCheck, Ledger, OutputFormat, ScenarioReport},
    session::Session,
    snapshot::{BalanceDifference, BalanceSnapshot},
    testnet::{LocalTestnet, Restart},
};

/// Default location of the MRENCLAVE fallback file.
pub const DEFAULT_MRENCLAVE_FILE: &str = "../bin/mrenclave.b58";

pub const ALICE: &str = "//Alice";
pub const BOB: &str = "//Bob";
pub const ALICE_PROXY: &str = "//AliceIcognito";
pub const BOB_PROXY: &str = "//BobIcognito";

/// Base token of the traded market.
pub const BTC: &str = "btc";
/// Quote token of the traded market.
pub const USD: &str = "usd";

pub const UNIT: Currency = PRECISION;

/// `UNIT / 100`, the granularity used by the small-amount scenarios.
pub const CENT: Currency = UNIT / 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    HappyFlow,
    OrderMatching,
    RejectedOrder,
    DepositWithdraw,
    CrashRecovery,
}

impl Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Scenario::HappyFlow => "happy-flow",
            Scenario::OrderMatching => "order-matching",
            Scenario::RejectedOrder => "rejected-order",
            Scenario::DepositWithdraw => "deposit-withdraw",
            Scenario::CrashRecovery => "crash-recovery",
        };
        f.write_str(name)
    }
}
