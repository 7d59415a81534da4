use ocex_client::Amount;
use thiserror::Error;

use crate::{BalanceDifference, Ledger};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Client(#[from] ocex_client::Error),

    #[error(transparent)]
    Testnet(#[from] ocex_testnet::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{ledger} balance of {account} in {token} is {actual}, expected {expected}")]
    BalanceMismatch {
        ledger: Ledger,
        account: String,
        token: String,
        expected: Amount,
        actual: Amount,
    },

    #[error("{} balance(s) changed across the restart: {}", .0.len(), format_differences(.0))]
    RecoveryMismatch(Vec<BalanceDifference>),

    #[error("the testnet is not running")]
    TestnetStopped,
}

fn format_differences(differences: &[BalanceDifference]) -> String {
    differences
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
