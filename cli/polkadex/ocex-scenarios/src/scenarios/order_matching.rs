//! Walks a fixed ladder of limit orders through the book and checks both traders' offchain
//! balances after every step, then places and cancels a resting bid.

use ocex_client::{
    CommandRunner, Currency, OcexClientExt, Order, OrderSide, SystemClientExt, TrustedClientExt,
};

use super::{market, register_traders};
use crate::{ScenarioError, Session, ALICE, BOB, BTC, UNIT, USD};

/// Offchain `(usd, btc)` of a trader, in whole units.
type Holdings = (u64, u64);

struct Step {
    trader: &'static str,
    side: OrderSide,
    quantity: u64,
    price: u64,
    alice: Holdings,
    bob: Holdings,
}

const fn step(
    trader: &'static str,
    side: OrderSide,
    quantity: u64,
    price: u64,
    alice: Holdings,
    bob: Holdings,
) -> Step {
    Step {
        trader,
        side,
        quantity,
        price,
        alice,
        bob,
    }
}

// Funds of a bid are reserved at its limit price, trades settle at the resting order's price.
const LADDER: [Step; 8] = [
    step(ALICE, OrderSide::Bid, 1, 2, (98, 10), (100, 10)),
    step(BOB, OrderSide::Ask, 1, 1, (98, 11), (102, 9)),
    step(ALICE, OrderSide::Ask, 3, 5, (98, 8), (102, 9)),
    step(BOB, OrderSide::Bid, 2, 7, (108, 8), (92, 11)),
    step(BOB, OrderSide::Bid, 2, 6, (113, 8), (81, 12)),
    step(ALICE, OrderSide::Ask, 1, 2, (119, 7), (81, 13)),
    step(BOB, OrderSide::Bid, 4, 5, (119, 7), (61, 13)),
    step(ALICE, OrderSide::Ask, 2, 2, (129, 5), (61, 15)),
];

const DEPOSIT_BTC: Currency = 10 * UNIT;
const DEPOSIT_USD: Currency = 100 * UNIT;

fn units(units: u64) -> Currency {
    Currency::from(units) * UNIT
}

async fn expect_holdings<R>(
    session: &mut Session<R>,
    account: &str,
    (usd, btc): Holdings,
) -> Result<(), ScenarioError>
where
    R: CommandRunner,
{
    session.expect_offchain(account, USD, units(usd)).await?;
    session.expect_offchain(account, BTC, units(btc)).await
}

#[tracing::instrument(skip_all, fields(test_run = ?session.report().test_run))]
pub async fn run<R>(session: &mut Session<R>) -> Result<(), ScenarioError>
where
    R: CommandRunner,
{
    register_traders(session.client()).await?;

    tracing::info!("Start depositing funds from onchain to offchain");
    for account in [ALICE, BOB] {
        session.client().deposit(account, BTC, DEPOSIT_BTC).await?;
        session.client().deposit(account, USD, DEPOSIT_USD).await?;
    }
    session.client().await_block().await?;

    expect_holdings(session, ALICE, (100, 10)).await?;
    expect_holdings(session, BOB, (100, 10)).await?;
    for account in [ALICE, BOB] {
        session.expect_onchain(account, BTC, 0).await?;
        session.expect_onchain(account, USD, 0).await?;
    }

    for step in &LADDER {
        session.client().await_block().await?;
        let order = Order::limit(market(), step.side, units(step.quantity), units(step.price));
        session.client().place_order(step.trader, None, &order).await?;
        session.client().await_block().await?;

        expect_holdings(session, ALICE, step.alice).await?;
        expect_holdings(session, BOB, step.bob).await?;
    }

    tracing::info!("Alice places a bid and cancels it");
    session.client().await_block().await?;
    let bid = Order::limit(market(), OrderSide::Bid, units(2), units(2));
    let order_id = session.client().place_order(ALICE, None, &bid).await?;
    session.client().await_block().await?;
    session.expect_offchain(ALICE, USD, units(125)).await?;

    let result = session
        .client()
        .cancel_order(ALICE, None, &market(), &order_id)
        .await?;
    tracing::info!("cancel result: {}", result);
    session.client().await_block().await?;
    expect_holdings(session, ALICE, (129, 5)).await?;

    Ok(())
}
