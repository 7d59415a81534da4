use std::future::Future;

use crate::{
    parse_balance, Amount, Client, CommandArgs, CommandRunner, Currency, Error, SystemClientExt,
};

/// Client to interact with the on-chain OCEX pallet extrinsics and balances.
///
/// Every extrinsic is followed by a one block wait, so the effect is visible to the next call.
pub trait OcexClientExt {
    /// Register `account` as a main account in the offchain registry.
    fn register_account(&self, account: &str) -> impl Future<Output = Result<String, Error>>;

    /// Register `proxy` as a proxy of `account`.
    fn register_proxy(
        &self,
        account: &str,
        proxy: &str,
    ) -> impl Future<Output = Result<String, Error>>;

    /// Remove `proxy` from the proxies of `account`.
    fn remove_proxy(
        &self,
        account: &str,
        proxy: &str,
    ) -> impl Future<Output = Result<String, Error>>;

    /// Move `quantity` of `token` from the on-chain balance into the offchain one.
    fn deposit(
        &self,
        account: &str,
        token: &str,
        quantity: Currency,
    ) -> impl Future<Output = Result<String, Error>>;

    /// Move `quantity` of `token` from the offchain balance back on-chain, through an extrinsic.
    fn withdraw(
        &self,
        account: &str,
        token: &str,
        quantity: Currency,
    ) -> impl Future<Output = Result<String, Error>>;

    /// Native on-chain balance of `account`.
    fn balance(&self, account: &str) -> impl Future<Output = Result<Currency, Error>>;

    /// On-chain balance of `account` in `token`.
    fn token_balance(
        &self,
        account: &str,
        token: &str,
    ) -> impl Future<Output = Result<Currency, Error>>;
}

impl<R> OcexClientExt for Client<R>
where
    R: CommandRunner,
{
    #[tracing::instrument(level = "debug", skip(self))]
    async fn register_account(&self, account: &str) -> Result<String, Error> {
        tracing::info!("Registering {}", account);
        let output = self
            .run(CommandArgs::subcommand(["register-account"]).positional(account))
            .await?;
        self.await_block().await?;
        Ok(output)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn register_proxy(&self, account: &str, proxy: &str) -> Result<String, Error> {
        tracing::info!("Registering proxy account {} for {}", proxy, account);
        let output = self
            .run(
                CommandArgs::subcommand(["register-proxy"])
                    .positional(account)
                    .positional(proxy),
            )
            .await?;
        self.await_block().await?;
        Ok(output)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn remove_proxy(&self, account: &str, proxy: &str) -> Result<String, Error> {
        tracing::info!("Removing proxy account {} of {}", proxy, account);
        let output = self
            .run(
                CommandArgs::subcommand(["remove-proxy"])
                    .positional(account)
                    .positional(proxy),
            )
            .await?;
        self.await_block().await?;
        Ok(output)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn deposit(&self, account: &str, token: &str, quantity: Currency) -> Result<String, Error> {
        tracing::info!(
            "Deposit {} {} to offchain account {}",
            Amount(quantity),
            token,
            account
        );
        let output = self
            .run(
                CommandArgs::subcommand(["deposit"])
                    .account(account, None)
                    .quantity(quantity)
                    .token(token),
            )
            .await?;
        self.await_block().await?;
        Ok(output)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn withdraw(&self, account: &str, token: &str, quantity: Currency) -> Result<String, Error> {
        tracing::info!("Withdrawing {} {} from {}", Amount(quantity), token, account);
        let output = self
            .run(
                CommandArgs::subcommand(["withdraw"])
                    .account(account, None)
                    .quantity(quantity)
                    .token(token),
            )
            .await?;
        self.await_block().await?;
        Ok(output)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn balance(&self, account: &str) -> Result<Currency, Error> {
        let output = self
            .run(CommandArgs::subcommand(["balance"]).positional(account))
            .await?;
        let balance = parse_balance(&output)?;
        tracing::info!("Onchain balance of {} {}", account, Amount(balance));
        Ok(balance)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn token_balance(&self, account: &str, token: &str) -> Result<Currency, Error> {
        let output = self
            .run(
                CommandArgs::subcommand(["token-balance"])
                    .positional(account)
                    .positional(token),
            )
            .await?;
        let balance = parse_balance(&output)?;
        tracing::info!(
            "Onchain balance of {} in {}: {}",
            account,
            token,
            Amount(balance)
        );
        Ok(balance)
    }
}
