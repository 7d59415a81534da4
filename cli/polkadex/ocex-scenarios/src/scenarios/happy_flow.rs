//! Two traders fund their offchain accounts, trade 0.05 btc for 0.05 usd and withdraw what
//! they received, one through the worker and one through the chain.

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

    tracing::info!("Checking balance of Alice and Bob onchain");
    let alice_usd = session.client().token_balance(ALICE, USD).await?;
    session.client().token_balance(ALICE, BTC).await?;
    let bob_btc = session.client().token_balance(BOB, BTC).await?;
    session.client().token_balance(BOB, USD).await?;

    tracing::info!("Start depositing funds from onchain to offchain");
    session.client().deposit(ALICE, BTC, DEPOSIT).await?;
    session.client().deposit(BOB, USD, DEPOSIT).await?;
    // Give the worker time to import the deposits.
    session.client().await_block().await?;
    session.expect_offchain(ALICE, BTC, DEPOSIT).await?;
    session.expect_offchain(BOB, USD, DEPOSIT).await?;

    tracing::info!("Alice places a sell order 0.05 btc for 0.05 usd");
    let ask = Order::limit(market(), OrderSide::Ask, TRADE, UNIT);
    session.client().place_order(ALICE, None, &ask).await?;
    session.client().await_block().await?;

    tracing::info!("Bob places a buy order 0.05 usd for 0.05 btc");
    let bid = Order::limit(market(), OrderSide::Bid, TRADE, UNIT);
    session.client().place_order(BOB, None, &bid).await?;
    session.client().await_block().await?;
    session.client().await_block().await?;

    tracing::info!("Checking if the trade settled");
    session.expect_offchain(ALICE, BTC, DEPOSIT - TRADE).await?;
    session.expect_offchain(ALICE, USD, TRADE).await?;
    session.expect_offchain(BOB, BTC, TRADE).await?;
    session.expect_offchain(BOB, USD, DEPOSIT - TRADE).await?;

    tracing::info!("Alice and Bob withdraw their newly traded tokens");
    session.client().direct_withdraw(ALICE, None, USD, TRADE).await?;
    session.client().withdraw(BOB, BTC, TRADE).await?;

    session.expect_offchain(ALICE, USD, 0).await?;
    session.expect_offchain(BOB, BTC, 0).await?;
    session.expect_onchain(ALICE, USD, alice_usd.saturating_add(TRADE)).await?;
    session.expect_onchain(BOB, BTC, bob_btc.saturating_add(TRADE)).await?;

    Ok(())
}
