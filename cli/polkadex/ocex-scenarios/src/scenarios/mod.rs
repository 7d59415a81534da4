//! The scripted scenarios. Each one runs linearly and stops at the first failed check.

pub mod crash_recovery;
pub mod deposit_withdraw;
pub mod happy_flow;
pub mod order_matching;
pub mod rejected_order;

use ocex_client::{Client, CommandRunner, Market, OcexClientExt};

use crate::{ScenarioError, ALICE, ALICE_PROXY, BOB, BOB_PROXY, BTC, USD};

/// The only market the scenarios trade on.
pub fn market() -> Market {
    Market::spot(BTC, USD)
}

/// Register Alice and Bob, then their proxies.
pub(crate) async fn register_traders<R>(client: &Client<R>) -> Result<(), ScenarioError>
where
    R: CommandRunner,
{
    client.register_account(ALICE).await?;
    client.register_account(BOB).await?;
    client.register_proxy(ALICE, ALICE_PROXY).await?;
    client.register_proxy(BOB, BOB_PROXY).await?;
    Ok(())
}
