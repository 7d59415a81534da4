use std::future::Future;

use ocex_testnet::{Testnet, TestnetConfig};

use crate::ScenarioError;

/// Something that can bring the trading system down and back up.
pub trait Restart {
    /// Return once the restarted processes accept connections again.
    fn restart(&mut self) -> impl Future<Output = Result<(), ScenarioError>>;
}

/// A node and worker launched from a clean state by the scenario runner.
#[derive(Debug)]
pub struct LocalTestnet {
    testnet: Option<Testnet>,
    restart_node: bool,
}

impl LocalTestnet {
    /// Remove the worker's state files, then launch the node and worker.
    ///
    /// When `restart_node` is set, [`Restart::restart`] takes the node down along with the
    /// worker.
    pub async fn launch(config: TestnetConfig, restart_node: bool) -> Result<Self, ScenarioError> {
        config.clear_state()?;
        let testnet = Testnet::launch(config).await?;
        Ok(Self {
            testnet: Some(testnet),
            restart_node,
        })
    }

    pub async fn shutdown(mut self) -> Result<(), ScenarioError> {
        if let Some(testnet) = self.testnet.take() {
            testnet.shutdown().await?;
        }
        Ok(())
    }
}

impl Restart for LocalTestnet {
    async fn restart(&mut self) -> Result<(), ScenarioError> {
        let testnet = self.testnet.take().ok_or(ScenarioError::TestnetStopped)?;
        let testnet = if self.restart_node {
            tracing::info!("restarting node and worker");
            testnet.restart().await?
        } else {
            tracing::info!("restarting worker");
            testnet.restart_worker().await?
        };
        self.testnet = Some(testnet);
        Ok(())
    }
}
