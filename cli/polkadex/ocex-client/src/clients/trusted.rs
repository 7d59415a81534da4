use std::future::Future;

use crate::{
    parse_balance, Amount, Client, CommandArgs, CommandRunner, Currency, Error, Market, Order,
    OrderId,
};

/// Client for the trusted calls, sent directly to the worker running the client's MRENCLAVE.
///
/// Unlike [`crate::OcexClientExt`], these calls don't wait for a block; it is up to the caller
/// to give the worker time to process them.
pub trait TrustedClientExt {
    /// Offchain balance of `account` in `token`.
    fn get_balance(
        &self,
        account: &str,
        token: &str,
    ) -> impl Future<Output = Result<Currency, Error>>;

    /// Place `order` on behalf of `account`, signed by `proxy` when one is given.
    fn place_order(
        &self,
        account: &str,
        proxy: Option<&str>,
        order: &Order,
    ) -> impl Future<Output = Result<OrderId, Error>>;

    /// Cancel a previously placed order.
    fn cancel_order(
        &self,
        account: &str,
        proxy: Option<&str>,
        market: &Market,
        order_id: &OrderId,
    ) -> impl Future<Output = Result<String, Error>>;

    /// Withdraw `quantity` of `token` through the worker's direct interface.
    fn direct_withdraw(
        &self,
        account: &str,
        proxy: Option<&str>,
        token: &str,
        quantity: Currency,
    ) -> impl Future<Output = Result<String, Error>>;
}

impl<R> TrustedClientExt for Client<R>
where
    R: CommandRunner,
{
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_balance(&self, account: &str, token: &str) -> Result<Currency, Error> {
        let output = self
            .run(
                CommandArgs::subcommand(["trusted", "get_balance"])
                    .account(account, None)
                    .token(token)
                    .direct(self.mrenclave()),
            )
            .await?;
        let balance = parse_balance(&output)?;
        tracing::info!(
            "Offchain balance of {} {} {}",
            account,
            Amount(balance),
            token
        );
        Ok(balance)
    }

    #[tracing::instrument(level = "debug", skip(self, order), fields(market = %order.market))]
    async fn place_order(
        &self,
        account: &str,
        proxy: Option<&str>,
        order: &Order,
    ) -> Result<OrderId, Error> {
        tracing::info!(
            "{} places {} {} {} {} at {}",
            proxy.unwrap_or(account),
            order.order_type,
            order.side,
            Amount(order.quantity),
            order.market.base,
            Amount(order.price)
        );
        let output = self
            .run(
                CommandArgs::subcommand(["trusted", "place_order"])
                    .account(account, proxy)
                    .order(order)
                    .direct(self.mrenclave()),
            )
            .await?;
        Ok(OrderId::from_output(&output))
    }

    #[tracing::instrument(level = "debug", skip(self, market), fields(market = %market))]
    async fn cancel_order(
        &self,
        account: &str,
        proxy: Option<&str>,
        market: &Market,
        order_id: &OrderId,
    ) -> Result<String, Error> {
        tracing::info!("Cancelling order {}", order_id);
        self.run(
            CommandArgs::subcommand(["trusted", "cancel_order"])
                .account(account, proxy)
                .market(market)
                .order_id(order_id)
                .direct(self.mrenclave()),
        )
        .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn direct_withdraw(
        &self,
        account: &str,
        proxy: Option<&str>,
        token: &str,
        quantity: Currency,
    ) -> Result<String, Error> {
        tracing::info!(
            "Withdrawing {} {} from {}",
            Amount(quantity),
            token,
            proxy.unwrap_or(account)
        );
        self.run(
            CommandArgs::subcommand(["trusted", "withdraw"])
                .account(account, proxy)
                .quantity(quantity)
                .token(token)
                .direct(self.mrenclave()),
        )
        .await
    }
}

#[cfg(test)]
mod test {
    use crate::{
        runner::test::ScriptedRunner, Client, Market, Order, OrderId, OrderSide, TrustedClientExt,
        PRECISION,
    };

    const MRENCLAVE: &str = "2HD4rixzbewVjXKb2ugtRYbmd9xxPaduF9JgXhTYiGdV";

    fn client(outputs: Vec<&str>) -> Client<ScriptedRunner> {
        Client::new(
            ScriptedRunner::new(outputs.into_iter().map(String::from)),
            MRENCLAVE.parse().unwrap(),
        )
    }

    #[tokio::test]
    async fn get_balance_is_direct() {
        let client = client(vec!["500000000000000000"]);
        let balance = client.get_balance("//Alice", "btc").await.unwrap();

        assert_eq!(balance, PRECISION / 2);
        assert_eq!(
            client.runner().calls(),
            vec![vec![
                "trusted",
                "get_balance",
                "--accountid=//Alice",
                "--tokenid=btc",
                "--mrenclave=2HD4rixzbewVjXKb2ugtRYbmd9xxPaduF9JgXhTYiGdV",
                "--direct",
            ]]
        );
    }

    #[tokio::test]
    async fn place_order_returns_unquoted_id() {
        let client = client(vec!["\"5c1f0d6e-order\"\n"]);
        let order = Order::limit(Market::spot("btc", "usd"), OrderSide::Bid, PRECISION, 2 * PRECISION);

        let order_id = client
            .place_order("//Alice", Some("//AliceIcognito"), &order)
            .await
            .unwrap();

        assert_eq!(order_id, OrderId::from("5c1f0d6e-order"));
        let calls = client.runner().calls();
        assert_eq!(calls.len(), 1, "trusted calls never wait for a block");
        assert_eq!(calls[0][2], "--accountid=//Alice");
        assert_eq!(calls[0][3], "--proxyaccountid=//AliceIcognito");
    }

    #[tokio::test]
    async fn cancel_order_args() {
        let client = client(vec!["true"]);
        let result = client
            .cancel_order(
                "//Alice",
                None,
                &Market::spot("btc", "usd"),
                &OrderId::from("5c1f0d6e-order"),
            )
            .await
            .unwrap();

        assert_eq!(result, "true");
        assert_eq!(
            client.runner().calls()[0],
            [
                "trusted",
                "cancel_order",
                "--accountid=//Alice",
                "--marketbase=btc",
                "--marketquote=usd",
                "--markettype=spot",
                "--orderid=5c1f0d6e-order",
                "--mrenclave=2HD4rixzbewVjXKb2ugtRYbmd9xxPaduF9JgXhTYiGdV",
                "--direct",
            ]
        );
    }

    #[tokio::test]
    async fn direct_withdraw_args() {
        let client = client(vec![]);
        client
            .direct_withdraw("//Alice", None, "usd", 50_000_000_000_000_000)
            .await
            .unwrap();

        assert_eq!(
            client.runner().calls()[0],
            [
                "trusted",
                "withdraw",
                "--accountid=//Alice",
                "--quantity=50000000000000000",
                "--tokenid=usd",
                "--mrenclave=2HD4rixzbewVjXKb2ugtRYbmd9xxPaduF9JgXhTYiGdV",
                "--direct",
            ]
        );
    }
}
