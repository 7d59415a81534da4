//! Restarts the trading system in the middle of a session and checks that the worker comes
//! back with the same offchain balances and the same order book.

use std::path::Path;

use ocex_client::{
    CommandRunner, Currency, OcexClientExt, Order, OrderSide, SystemClientExt, TrustedClientExt,
};

use super::{market, register_traders};
use crate::{BalanceSnapshot, Restart, ScenarioError, Session, ALICE, BOB, BTC, CENT, UNIT, USD};

const DEPOSIT: Currency = 50 * CENT;
const TRADE: Currency = 5 * CENT;

/// Run the scenario, restarting through `testnet` once Alice's ask is resting.
///
/// The balances read before the restart are written to `snapshot_path` as JSON.
#[tracing::instrument(skip_all, fields(test_run = ?session.report().test_run))]
pub async fn run<R, T>(
    session: &mut Session<R>,
    testnet: &mut T,
    snapshot_path: &Path,
) -> Result<(), ScenarioError>
where
    R: CommandRunner,
    T: Restart,
{
    register_traders(session.client()).await?;

    session.client().deposit(ALICE, BTC, DEPOSIT).await?;
    session.client().deposit(BOB, USD, DEPOSIT).await?;
    session.client().await_block().await?;
    session.expect_offchain(ALICE, BTC, DEPOSIT).await?;
    session.expect_offchain(BOB, USD, DEPOSIT).await?;

    tracing::info!("Alice places a sell order that stays in the book");
    let ask = Order::limit(market(), OrderSide::Ask, TRADE, UNIT);
    session.client().place_order(ALICE, None, &ask).await?;
    session.client().await_block().await?;
    session.expect_offchain(ALICE, BTC, DEPOSIT - TRADE).await?;

    let before = BalanceSnapshot::capture(session.client(), &[ALICE, BOB], &[BTC, USD]).await?;
    before.save(snapshot_path)?;

    testnet.restart().await?;
    session.client().await_block().await?;

    let after = BalanceSnapshot::capture(session.client(), &[ALICE, BOB], &[BTC, USD]).await?;
    let differences = before.diff(&after);
    if !differences.is_empty() {
        for difference in &differences {
            tracing::error!("{}", difference);
        }
        return Err(ScenarioError::RecoveryMismatch(differences));
    }

    tracing::info!("Bob takes the ask placed before the restart");
    let bid = Order::limit(market(), OrderSide::Bid, TRADE, UNIT);
    session.client().place_order(BOB, None, &bid).await?;
    session.client().await_block().await?;
    session.client().await_block().await?;

    session.expect_offchain(ALICE, USD, TRADE).await?;
    session.expect_offchain(BOB, BTC, TRADE).await?;
    session.expect_offchain(BOB, USD, DEPOSIT - TRADE).await?;

    Ok(())
}
