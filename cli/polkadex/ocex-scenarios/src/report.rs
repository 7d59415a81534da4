use std::fmt::Display;

use ocex_client::Amount;
use serde::{Deserialize, Serialize};

use crate::Scenario;

/// Where a balance is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ledger {
    /// The chain, read with `token-balance`.
    Onchain,
    /// The worker, read with `trusted get_balance`.
    Offchain,
}

impl Display for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ledger::Onchain => f.write_str("onchain"),
            Ledger::Offchain => f.write_str("offchain"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceCheck {
    pub ledger: Ledger,
    pub account: String,
    pub token: String,
    pub expected: Amount,
    pub actual: Amount,
}

impl BalanceCheck {
    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

impl Display for BalanceCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.passed() { "ok" } else { "MISMATCH" };
        write!(
            f,
            "[{status}] {} {} {}: expected {}, got {}",
            self.ledger, self.account, self.token, self.expected, self.actual
        )
    }
}

/// Every balance check a scenario performed, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_run: Option<u32>,
    pub checks: Vec<BalanceCheck>,
}

impl ScenarioReport {
    pub fn new(scenario: Scenario, test_run: Option<u32>) -> Self {
        Self {
            scenario,
            test_run,
            checks: vec![],
        }
    }

    pub fn passed(&self) -> bool {
        self.checks.iter().all(BalanceCheck::passed)
    }
}

impl Display for ScenarioReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.test_run {
            Some(test_run) => writeln!(f, "Scenario {} (test run {})", self.scenario, test_run)?,
            None => writeln!(f, "Scenario {}", self.scenario)?,
        }
        for check in &self.checks {
            writeln!(f, "  {check}")?;
        }
        let passed = self.checks.iter().filter(|check| check.passed()).count();
        write!(f, "{}/{} checks passed", passed, self.checks.len())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

impl OutputFormat {
    pub fn format<T>(self, value: &T) -> Result<String, serde_json::Error>
    where
        T: Display + Serialize,
    {
        match self {
            OutputFormat::Plain => Ok(value.to_string()),
            OutputFormat::Json => serde_json::to_string(value),
        }
    }
}

#[cfg(test)]
mod test {
    use ocex_client::Amount;

    use super::{BalanceCheck, Ledger, OutputFormat, ScenarioReport};
    use crate::{Scenario, CENT};

    fn report() -> ScenarioReport {
        let mut report = ScenarioReport::new(Scenario::HappyFlow, Some(2));
        report.checks.push(BalanceCheck {
            ledger: Ledger::Offchain,
            account: "//Alice".to_string(),
            token: "btc".to_string(),
            expected: Amount(50 * CENT),
            actual: Amount(50 * CENT),
        });
        report.checks.push(BalanceCheck {
            ledger: Ledger::Onchain,
            account: "//Bob".to_string(),
            token: "usd".to_string(),
            expected: Amount(5 * CENT),
            actual: Amount::ZERO,
        });
        report
    }

    #[test]
    fn plain_output() {
        let output = OutputFormat::Plain.format(&report()).unwrap();
        assert_eq!(
            output,
            "Scenario happy-flow (test run 2)\n\
             \x20 [ok] offchain //Alice btc: expected 0.5, got 0.5\n\
             \x20 [MISMATCH] onchain //Bob usd: expected 0.05, got 0\n\
             1/2 checks passed"
        );
    }

    #[test]
    fn json_output() {
        let output = OutputFormat::Json.format(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["scenario"], "happy-flow");
        assert_eq!(value["test_run"], 2);
        assert_eq!(value["checks"][0]["ledger"], "offchain");
        assert_eq!(value["checks"][1]["expected"], 50_000_000_000_000_000u64);
    }

    #[test]
    fn report_passes_only_when_all_checks_do() {
        let mut report = report();
        assert!(!report.passed());
        report.checks.pop();
        assert!(report.passed());
    }
}
