use std::future::Future;

use crate::{mrenclave::parse_worker_list, Client, CommandArgs, CommandRunner, Error, Mrenclave};

/// Chain-level helpers that don't touch any account.
pub trait SystemClientExt {
    /// MRENCLAVEs of the workers registered on-chain.
    fn list_workers(&self) -> impl Future<Output = Result<Vec<Mrenclave>, Error>>;

    /// Block until the client has seen `n_blocks` new blocks.
    fn await_blocks(&self, n_blocks: u32) -> impl Future<Output = Result<(), Error>>;

    /// Block until the next block, the ledger is expected to have caught up by then.
    fn await_block(&self) -> impl Future<Output = Result<(), Error>> {
        self.await_blocks(1)
    }
}

impl<R> SystemClientExt for Client<R>
where
    R: CommandRunner,
{
    async fn list_workers(&self) -> Result<Vec<Mrenclave>, Error> {
        let output = self.run(CommandArgs::subcommand(["list-workers"])).await?;
        parse_worker_list(&output)
    }

    #[tracing::instrument(level = "trace", skip(self))]
    async fn await_blocks(&self, n_blocks: u32) -> Result<(), Error> {
        self.run(
            CommandArgs::subcommand(["listen", "-b"]).positional(n_blocks.to_string()),
        )
        .await?;
        Ok(())
    }
}
