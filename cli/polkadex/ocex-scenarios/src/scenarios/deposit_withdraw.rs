//! Moves funds onto the worker and part of them back through a withdraw extrinsic.

use ocex_client::{CommandRunner, Currency, OcexClientExt, SystemClientExt};

use crate::{ScenarioError, Session, ALICE, BTC, CENT};

const DEPOSIT: Currency = 50 * CENT;
const WITHDRAWAL: Currency = 5 * CENT;

#[tracing::instrument(skip_all, fields(test_run = ?session.report().test_run))]
pub async fn run<R>(session: &mut Session<R>) -> Result<(), ScenarioError>
where
    R: CommandRunner,
{
    session.client().register_account(ALICE).await?;
    let onchain = session.client().token_balance(ALICE, BTC).await?;

    session.client().deposit(ALICE, BTC, DEPOSIT).await?;
    session.client().await_block().await?;
    session.expect_offchain(ALICE, BTC, DEPOSIT).await?;
    session.expect_onchain(ALICE, BTC, onchain.saturating_sub(DEPOSIT)).await?;

    session.client().withdraw(ALICE, BTC, WITHDRAWAL).await?;
    session.expect_offchain(ALICE, BTC, DEPOSIT - WITHDRAWAL).await?;
    session
        .expect_onchain(ALICE, BTC, onchain.saturating_sub(DEPOSIT) + WITHDRAWAL)
        .await?;

    Ok(())
}
