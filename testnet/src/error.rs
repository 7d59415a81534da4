use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to spawn {name} ({}): {source}", .binary.display())]
    Spawn {
        name: String,
        binary: PathBuf,
        source: std::io::Error,
    },

    #[error("{name} exited before becoming ready (exit code {code:?})")]
    ExitedEarly { name: String, code: Option<i32> },

    #[error("port {port} not reachable after {attempts} attempts")]
    NotReady { port: u16, attempts: u32 },
}
