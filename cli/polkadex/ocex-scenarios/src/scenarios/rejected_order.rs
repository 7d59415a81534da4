//! Bob bids far above what his offchain balance can pay for. The worker must refuse the bid,
//! leaving Alice's ask resting and both balances untouched apart from Alice's reservation.

use ocex_client::{
    CommandRunner, Currency, OcexClientExt, Order, OrderSide, SystemClientExt, TrustedClientExt,
};

use super::{market, register_traders};
use crate::{ScenarioError, Session, ALICE, BOB, BTC, CENT, UNIT, USD};

const DEPOSIT: Currency = 50 * CENT;
const TRADE: Currency = 5 * CENT;

#[tracing::instrument(skip_all, fields(test_run = ?session.report().test_run))]
pub async fn run<R>(session: &mut Session<R>) -> Result<(), ScenarioError>
where
    R: CommandRunner,
{
    register_traders(session.client()).await?;

    tracing::info!("Start depositing funds from onchain to offchain");
    session.client().deposit(ALICE, BTC, DEPOSIT).await?;
    session.client().deposit(BOB, USD, DEPOSIT).await?;
    session.client().token_balance(ALICE, BTC).await?;
    session.client().token_balance(BOB, USD).await?;
    session.client().await_block().await?;
    session.expect_offchain(ALICE, BTC, DEPOSIT).await?;
    session.expect_offchain(BOB, USD, DEPOSIT).await?;

    tracing::info!("Alice places a sell order 0.05 btc for 0.05 usd");
    let ask = Order::limit(market(), OrderSide::Ask, TRADE, UNIT);
    session.client().place_order(ALICE, None, &ask).await?;
    session.client().await_block().await?;

    tracing::info!("Bob places a buy order 0.05 btc at 11 usd, more than he owns");
    let bid = Order::limit(market(), OrderSide::Bid, TRADE, 11 * UNIT);
    match session.client().place_order(BOB, None, &bid).await {
        Ok(order_id) => tracing::info!("worker answered with order id {}", order_id),
        Err(err) => tracing::info!("worker refused the order: {}", err),
    }
    session.client().await_block().await?;
    session.client().await_block().await?;

    tracing::info!("Checking that no trade happened");
    session.expect_offchain(ALICE, BTC, DEPOSIT - TRADE).await?;
    session.expect_offchain(ALICE, USD, 0).await?;
    session.expect_offchain(BOB, BTC, 0).await?;
    session.expect_offchain(BOB, USD, DEPOSIT).await?;

    Ok(())
}
