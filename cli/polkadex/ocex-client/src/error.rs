use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while driving the client executable.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("`{command}` failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("client output is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("expected an integer balance, got {0:?}")]
    InvalidBalance(String),

    #[error("invalid MRENCLAVE {value:?}: {reason}")]
    InvalidMrenclave { value: String, reason: String },

    #[error("no registered workers and no MRENCLAVE found in {}", .0.display())]
    NoWorkers(PathBuf),

    #[error("amount {0} does not fit the fixed-point range")]
    AmountOutOfRange(String),

    #[error("Decimal error: {0}")]
    Decimal(#[from] rust_decimal::Error),
}
