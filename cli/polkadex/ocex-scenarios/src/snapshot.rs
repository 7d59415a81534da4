use std::{collections::BTreeMap, fmt::Display, path::Path};

use ocex_client::{Amount, Client, CommandRunner, TrustedClientExt};
use serde::{Deserialize, Serialize};

use crate::ScenarioError;

/// Offchain balances keyed by account, then token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSnapshot(BTreeMap<String, BTreeMap<String, Amount>>);

impl BalanceSnapshot {
    /// Read the offchain balance of every account in every token.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn capture<R>(
        client: &Client<R>,
        accounts: &[&str],
        tokens: &[&str],
    ) -> Result<Self, ScenarioError>
    where
        R: CommandRunner,
    {
        let mut snapshot = Self::default();
        for account in accounts {
            for token in tokens {
                let balance = client.get_balance(account, token).await?;
                snapshot.insert(account, token, Amount(balance));
            }
        }
        Ok(snapshot)
    }

    pub fn insert(&mut self, account: &str, token: &str, balance: Amount) {
        self.0
            .entry(account.to_string())
            .or_default()
            .insert(token.to_string(), balance);
    }

    pub fn get(&self, account: &str, token: &str) -> Option<Amount> {
        self.0.get(account)?.get(token).copied()
    }

    /// Every entry of `self` that is missing or different in `after`.
    pub fn diff(&self, after: &BalanceSnapshot) -> Vec<BalanceDifference> {
        let mut differences = vec![];
        for (account, balances) in &self.0 {
            for (token, before) in balances {
                let now = after.get(account, token);
                if now != Some(*before) {
                    differences.push(BalanceDifference {
                        account: account.clone(),
                        token: token.clone(),
                        before: *before,
                        after: now,
                    });
                }
            }
        }
        differences
    }

    pub fn save(&self, path: &Path) -> Result<(), ScenarioError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        tracing::debug!("wrote balance snapshot to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDifference {
    pub account: String,
    pub token: String,
    pub before: Amount,
    /// `None` when the balance could not be found anymore.
    pub after: Option<Amount>,
}

impl Display for BalanceDifference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.after {
            Some(after) => write!(
                f,
                "{} {} went from {} to {}",
                self.account, self.token, self.before, after
            ),
            None => write!(
                f,
                "{} {} was {} and is now missing",
                self.account, self.token, self.before
            ),
        }
    }
}
