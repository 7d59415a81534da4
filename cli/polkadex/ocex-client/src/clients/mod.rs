mod ocex;
mod system;
mod trusted;

use std::path::Path;

pub use ocex::OcexClientExt;
pub use system::SystemClientExt;
pub use trusted::TrustedClientExt;

use crate::{mrenclave, CommandArgs, CommandRunner, Error, Mrenclave};

/// Client to drive the exchange through `substratee-client`.
///
/// Carries everything a call needs: how to run the executable and which worker to address
/// direct calls to. Operations are provided by the [`OcexClientExt`], [`TrustedClientExt`]
/// and [`SystemClientExt`] traits.
#[derive(Debug, Clone)]
pub struct Client<R> {
    runner: R,
    mrenclave: Mrenclave,
}

impl<R> Client<R>
where
    R: CommandRunner,
{
    pub fn new(runner: R, mrenclave: Mrenclave) -> Self {
        Self { runner, mrenclave }
    }

    /// Create a [`Client`] addressing the first worker found, see [`mrenclave::discover`].
    pub async fn connect(runner: R, mrenclave_file: &Path) -> Result<Self, Error> {
        let workers = mrenclave::discover(&runner, mrenclave_file).await?;
        let mrenclave = workers
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoWorkers(mrenclave_file.to_path_buf()))?;
        tracing::info!("Using mrenclave of first worker as default: {}", mrenclave);
        Ok(Self::new(runner, mrenclave))
    }

    pub fn mrenclave(&self) -> &Mrenclave {
        &self.mrenclave
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub(crate) async fn run(&self, args: CommandArgs) -> Result<String, Error> {
        tracing::debug!(%args, "running client");
        self.runner.run(args.as_slice()).await
    }
}
