use ocex_client::{Amount, Client, CommandRunner, Currency, OcexClientExt, TrustedClientExt};

use crate::{BalanceCheck, Ledger, Scenario, ScenarioError, ScenarioReport};

/// A client together with the report of the scenario it is driving.
#[derive(Debug)]
pub struct Session<R> {
    client: Client<R>,
    report: ScenarioReport,
}

impl<R> Session<R>
where
    R: CommandRunner,
{
    pub fn new(client: Client<R>, scenario: Scenario, test_run: Option<u32>) -> Self {
        Self {
            client,
            report: ScenarioReport::new(scenario, test_run),
        }
    }

    pub fn client(&self) -> &Client<R> {
        &self.client
    }

    pub fn report(&self) -> &ScenarioReport {
        &self.report
    }

    pub fn into_report(self) -> ScenarioReport {
        self.report
    }

    /// Compare the worker's balance of `account` in `token` against `expected`.
    pub async fn expect_offchain(
        &mut self,
        account: &str,
        token: &str,
        expected: Currency,
    ) -> Result<(), ScenarioError> {
        let actual = self.client.get_balance(account, token).await?;
        self.record(Ledger::Offchain, account, token, expected, actual)
    }

    /// Compare the chain's balance of `account` in `token` against `expected`.
    pub async fn expect_onchain(
        &mut self,
        account: &str,
        token: &str,
        expected: Currency,
    ) -> Result<(), ScenarioError> {
        let actual = self.client.token_balance(account, token).await?;
        self.record(Ledger::Onchain, account, token, expected, actual)
    }

    fn record(
        &mut self,
        ledger: Ledger,
        account: &str,
        token: &str,
        expected: Currency,
        actual: Currency,
    ) -> Result<(), ScenarioError> {
        let check = BalanceCheck {
            ledger,
            account: account.to_string(),
            token: token.to_string(),
            expected: Amount(expected),
            actual: Amount(actual),
        };
        let passed = check.passed();
        self.report.checks.push(check);

        if passed {
            tracing::info!(%ledger, account, token, "balance is {}", Amount(actual));
            return Ok(());
        }

        tracing::error!(
            %ledger,
            account,
            token,
            "value doesn't match: {} != {}",
            Amount(actual),
            Amount(expected)
        );
        Err(ScenarioError::BalanceMismatch {
            ledger,
            account: account.to_string(),
            token: token.to_string(),
            expected: Amount(expected),
            actual: Amount(actual),
        })
    }
}
