//! Lifecycle of the external node and worker processes used by the end-to-end scenarios.

mod error;
mod process;
mod readiness;
mod state;

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

pub use crate::{
    error::Error,
    process::{ManagedProcess, ProcessSpec},
    readiness::wait_for_port,
    state::remove_state_files,
};

pub const NODE_BINARY: &str = "polkadex-node";
pub const WORKER_BINARY: &str = "substratee-worker";

/// Worker files that hold state across restarts, relative to its working directory.
pub const WORKER_STATE_FILES: &[&str] = &["orderbook.bin", "chain_relay_db.bin", "shards"];

/// Find `name` in the first of `search_dirs` that contains it.
pub fn find_binary<P>(name: &str, search_dirs: &[P]) -> Option<PathBuf>
where
    P: AsRef<Path>,
{
    for dir in search_dirs {
        let candidate = dir.as_ref().join(name);
        tracing::debug!("searching for {} in {}", name, candidate.display());
        if candidate.is_file() {
            return Some(candidate.canonicalize().unwrap_or(candidate));
        }
    }
    None
}

/// How to launch the node/worker pair.
#[derive(Debug, Clone)]
pub struct TestnetConfig {
    pub node_binary: PathBuf,
    pub node_port: u16,
    /// Appended after the default `--dev --ws-port <node_port>`.
    pub node_args: Vec<String>,
    pub worker_binary: PathBuf,
    pub worker_port: u16,
    /// Appended after the default `-p <node_port> -P <worker_port> run`.
    pub worker_args: Vec<String>,
    /// Working directory of both processes, also holds their logs.
    pub workdir: PathBuf,
    pub state_files: Vec<PathBuf>,
    pub n_retries: u32,
    pub retry_interval: Duration,
}

impl TestnetConfig {
    pub fn node_spec(&self) -> ProcessSpec {
        ProcessSpec::new("node", &self.node_binary, &self.workdir)
            .with_args(["--dev".to_string(), "--ws-port".to_string(), self.node_port.to_string()])
            .with_args(self.node_args.iter().cloned())
    }

    pub fn worker_spec(&self) -> ProcessSpec {
        ProcessSpec::new("worker", &self.worker_binary, &self.workdir)
            .with_args([
                "-p".to_string(),
                self.node_port.to_string(),
                "-P".to_string(),
                self.worker_port.to_string(),
                "run".to_string(),
            ])
            .with_args(self.worker_args.iter().cloned())
    }

    /// Remove the worker's persisted state so the next launch starts fresh.
    pub fn clear_state(&self) -> Result<(), Error> {
        remove_state_files(&self.workdir, &self.state_files)
    }
}

/// A running node and worker.
#[derive(Debug)]
pub struct Testnet {
    config: TestnetConfig,
    node: ManagedProcess,
    worker: ManagedProcess,
}

impl Testnet {
    /// Launch the node, wait for its port, then do the same for the worker.
    ///
    /// Readiness only means something accepts connections on the port. Each process must
    /// also still be alive one `retry_interval` later, which catches a new process that
    /// crashes while a stale one keeps the port open.
    #[tracing::instrument(skip_all, fields(node_port = config.node_port, worker_port = config.worker_port))]
    pub async fn launch(config: TestnetConfig) -> Result<Self, Error> {
        let node = Self::launch_ready(config.node_spec(), config.node_port, &config).await?;
        let worker = Self::launch_ready(config.worker_spec(), config.worker_port, &config).await?;
        Ok(Self {
            config,
            node,
            worker,
        })
    }

    async fn launch_ready(
        spec: ProcessSpec,
        port: u16,
        config: &TestnetConfig,
    ) -> Result<ManagedProcess, Error> {
        let mut process = ManagedProcess::spawn(spec)?;
        let ready = wait_for_port(port, config.n_retries, config.retry_interval).await;
        // The port may belong to a leftover process from an earlier run, so the new one
        // has to survive one more interval to count as ready.
        tokio::time::sleep(config.retry_interval).await;
        // A crashed process reports better than a closed port.
        process.ensure_running()?;
        ready?;
        Ok(process)
    }

    pub fn config(&self) -> &TestnetConfig {
        &self.config
    }

    /// Kill the worker and launch it again, keeping its state on disk.
    #[tracing::instrument(skip_all)]
    pub async fn restart_worker(self) -> Result<Self, Error> {
        let Self {
            config,
            node,
            worker,
        } = self;
        let spec = worker.kill().await?;
        let worker = Self::launch_ready(spec, config.worker_port, &config).await?;
        Ok(Self {
            config,
            node,
            worker,
        })
    }

    /// Kill both processes (worker first) and launch them again.
    #[tracing::instrument(skip_all)]
    pub async fn restart(self) -> Result<Self, Error> {
        let Self {
            config,
            node,
            worker,
        } = self;
        worker.kill().await?;
        node.kill().await?;
        Self::launch(config).await
    }

    /// Whether both processes are still alive.
    pub fn is_running(&mut self) -> Result<bool, Error> {
        Ok(self.node.is_running()? && self.worker.is_running()?)
    }

    pub async fn shutdown(self) -> Result<(), Error> {
        self.worker.kill().await?;
        self.node.kill().await?;
        Ok(())
    }
}
