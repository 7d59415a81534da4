//! MRENCLAVE handling.
//!
//! The MRENCLAVE identifies the enclave build a worker is running and is required to address
//! direct (trusted) calls. Workers registered on-chain are listed by `list-workers`; when the
//! node has none yet, a newline-delimited file produced at enclave build time is used instead.

use std::{fmt::Display, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{CommandArgs, CommandRunner, Error};

/// Length of the measurement, in bytes.
const MRENCLAVE_LEN: usize = 32;

/// Base58 encoded enclave measurement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Mrenclave(String);

impl Mrenclave {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Mrenclave {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|err| Error::InvalidMrenclave {
                value: s.to_string(),
                reason: err.to_string(),
            })?;
        if decoded.len() != MRENCLAVE_LEN {
            return Err(Error::InvalidMrenclave {
                value: s.to_string(),
                reason: format!("expected {MRENCLAVE_LEN} bytes, got {}", decoded.len()),
            });
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for Mrenclave {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Mrenclave> for String {
    fn from(value: Mrenclave) -> Self {
        value.0
    }
}

impl Display for Mrenclave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the MRENCLAVEs from the output of `list-workers`.
///
/// Every line mentioning `MRENCLAVE` carries the value as its second whitespace separated word,
/// e.g. `   MRENCLAVE: 2HD4rixzbewVjXKb2ugtRYbmd9xxPaduF9JgXhTYiGdV`.
pub fn parse_worker_list(output: &str) -> Result<Vec<Mrenclave>, Error> {
    output
        .lines()
        .filter(|line| line.contains("MRENCLAVE"))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(Mrenclave::from_str)
        .collect()
}

/// Read a newline-delimited list of MRENCLAVEs, blank lines are skipped.
pub fn read_mrenclave_file(path: &Path) -> Result<Vec<Mrenclave>, Error> {
    std::fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Mrenclave::from_str)
        .collect()
}

/// Find the MRENCLAVEs of the available workers.
///
/// Registered workers take precedence; `fallback` is only read when the node lists none.
#[tracing::instrument(level = "debug", skip_all, fields(fallback = %fallback.display()))]
pub async fn discover<R>(runner: &R, fallback: &Path) -> Result<Vec<Mrenclave>, Error>
where
    R: CommandRunner,
{
    let output = runner
        .run(CommandArgs::subcommand(["list-workers"]).as_slice())
        .await?;
    let registered = parse_worker_list(&output)?;
    if !registered.is_empty() {
        tracing::info!("Reading MRENCLAVE from registered list");
        return Ok(registered);
    }

    tracing::info!("Reading MRENCLAVE from file");
    let from_file = match read_mrenclave_file(fallback) {
        Ok(workers) => workers,
        Err(Error::IoError(err)) if err.kind() == std::io::ErrorKind::NotFound => vec![],
        Err(err) => return Err(err),
    };
    if from_file.is_empty() {
        return Err(Error::NoWorkers(fallback.to_path_buf()));
    }
    Ok(from_file)
}
