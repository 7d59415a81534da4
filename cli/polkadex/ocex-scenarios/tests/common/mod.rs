//! In-process stand-in for `substratee-client` and the system behind it.

use std::{cell::RefCell, collections::HashMap};

use ocex_client::{Client, CommandRunner, Currency, Error, PRECISION};
use ocex_scenarios::{Restart, ScenarioError};

pub const MRENCLAVE: &str = "2HD4rixzbewVjXKb2ugtRYbmd9xxPaduF9JgXhTYiGdV";

/// Onchain funds every account starts with, `(token, amount)`.
const GENESIS: [(&str, Currency); 2] = [("btc", 10 * PRECISION), ("usd", 100 * PRECISION)];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Behaviour {
    #[default]
    Honest,
    /// Orders are accepted and reserve funds but never match.
    NoSettlement,
    /// Restarting wipes offchain balances and the order book.
    ForgetsOnRestart,
}

#[derive(Debug, Clone)]
struct RestingOrder {
    id: String,
    account: String,
    base: String,
    quote: String,
    quantity: Currency,
    price: Currency,
}

#[derive(Debug, Default)]
struct State {
    onchain: HashMap<(String, String), Currency>,
    offchain: HashMap<(String, String), Currency>,
    /// Resting orders in arrival order.
    bids: Vec<RestingOrder>,
    asks: Vec<RestingOrder>,
    next_order: u64,
    calls: Vec<Vec<String>>,
}

/// Keeps onchain and offchain ledgers plus a price-time priority order book.
///
/// Bids reserve `quantity * limit` of the quote token, asks reserve `quantity` of the base
/// token. Trades settle at the resting order's price and bids get the difference to their
/// limit refunded.
#[derive(Debug, Default)]
pub struct FakeExchange {
    behaviour: Behaviour,
    state: RefCell<State>,
}

fn failed(args: &[String], stderr: impl Into<String>) -> Error {
    Error::CommandFailed {
        command: args.join(" "),
        code: Some(1),
        stderr: stderr.into(),
    }
}

fn value(quantity: Currency, price: Currency) -> Currency {
    quantity * price / PRECISION
}

impl FakeExchange {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            state: RefCell::default(),
        }
    }

    pub fn client(&self) -> Client<&Self> {
        Client::new(self, MRENCLAVE.parse().unwrap())
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.state.borrow().calls.clone()
    }

    pub fn offchain(&self, account: &str, token: &str) -> Currency {
        self.state.borrow().offchain_balance(account, token)
    }

    /// Override the onchain balance of `account` in `token`.
    pub fn set_onchain(&self, account: &str, token: &str, amount: Currency) {
        self.state
            .borrow_mut()
            .onchain
            .insert(State::key(account, token), amount);
    }

    fn restart(&self) {
        if self.behaviour == Behaviour::ForgetsOnRestart {
            let mut state = self.state.borrow_mut();
            state.offchain.clear();
            state.bids.clear();
            state.asks.clear();
        }
    }

    fn handle(&self, args: &[String]) -> Result<String, Error> {
        let mut state = self.state.borrow_mut();
        state.calls.push(args.to_vec());

        let words: Vec<&str> = args
            .iter()
            .filter(|arg| !arg.starts_with("--"))
            .map(String::as_str)
            .collect();
        let flags: HashMap<&str, &str> = args
            .iter()
            .filter_map(|arg| arg.strip_prefix("--"))
            .map(|flag| flag.split_once('=').unwrap_or((flag, "")))
            .collect();
        let flag = |name: &str| {
            flags
                .get(name)
                .copied()
                .ok_or_else(|| failed(args, format!("missing --{name}")))
        };
        let amount = |name: &str| -> Result<Currency, Error> {
            flag(name)?
                .parse()
                .map_err(|_| failed(args, format!("bad --{name}")))
        };

        match words.as_slice() {
            ["list-workers"] => Ok(format!(
                "number of workers registered: 1\nWorker 1\n   MRENCLAVE: {MRENCLAVE}"
            )),
            ["listen", "-b", _] => Ok(String::new()),
            ["register-account", _] | ["register-proxy", _, _] | ["remove-proxy", _, _] => {
                Ok("[+] Transaction got finalized".to_string())
            }
            ["balance", _] => Ok((1000 * PRECISION).to_string()),
            ["token-balance", account, token] => {
                Ok(state.onchain_balance(account, token).to_string())
            }
            ["deposit"] => {
                let (account, token, quantity) =
                    (flag("accountid")?, flag("tokenid")?, amount("quantity")?);
                state.debit_onchain(account, token, quantity, args)?;
                state.credit(account, token, quantity);
                Ok("[+] Transaction got finalized".to_string())
            }
            ["withdraw"] => {
                let (account, token, quantity) =
                    (flag("accountid")?, flag("tokenid")?, amount("quantity")?);
                state.withdraw(account, token, quantity, args)?;
                Ok("[+] Transaction got finalized".to_string())
            }
            ["trusted", call] => {
                if flag("mrenclave")? != MRENCLAVE || !flags.contains_key("direct") {
                    return Err(failed(args, "trusted calls must go directly to the enclave"));
                }
                let account = flag("accountid")?;
                match *call {
                    "get_balance" => {
                        Ok(state.offchain_balance(account, flag("tokenid")?).to_string())
                    }
                    "withdraw" => {
                        state.withdraw(account, flag("tokenid")?, amount("quantity")?, args)?;
                        Ok("true".to_string())
                    }
                    "place_order" => {
                        state.next_order += 1;
                        let order = RestingOrder {
                            id: format!("order-{}", state.next_order),
                            account: account.to_string(),
                            base: flag("marketbase")?.to_string(),
                            quote: flag("marketquote")?.to_string(),
                            quantity: amount("quantity")?,
                            price: amount("price")?,
                        };
                        let id = order.id.clone();
                        match flag("orderside")? {
                            "bid" => state.place_bid(order, self.behaviour, args)?,
                            "ask" => state.place_ask(order, self.behaviour, args)?,
                            side => return Err(failed(args, format!("unknown side {side}"))),
                        }
                        Ok(format!("\"{id}\""))
                    }
                    "cancel_order" => {
                        state.cancel(account, flag("orderid")?, args)?;
                        Ok("true".to_string())
                    }
                    _ => Err(failed(args, "unknown trusted call")),
                }
            }
            _ => Err(failed(args, "unknown subcommand")),
        }
    }
}

impl State {
    fn key(account: &str, token: &str) -> (String, String) {
        (account.to_string(), token.to_string())
    }

    fn onchain_balance(&self, account: &str, token: &str) -> Currency {
        self.onchain
            .get(&Self::key(account, token))
            .copied()
            .unwrap_or_else(|| {
                GENESIS
                    .iter()
                    .find(|(genesis_token, _)| *genesis_token == token)
                    .map_or(0, |(_, amount)| *amount)
            })
    }

    fn offchain_balance(&self, account: &str, token: &str) -> Currency {
        self.offchain
            .get(&Self::key(account, token))
            .copied()
            .unwrap_or(0)
    }

    fn credit(&mut self, account: &str, token: &str, quantity: Currency) {
        *self.offchain.entry(Self::key(account, token)).or_default() += quantity;
    }

    fn debit(
        &mut self,
        account: &str,
        token: &str,
        quantity: Currency,
        args: &[String],
    ) -> Result<(), Error> {
        let balance = self.offchain_balance(account, token);
        let remaining = balance
            .checked_sub(quantity)
            .ok_or_else(|| failed(args, format!("insufficient {token} balance")))?;
        self.offchain.insert(Self::key(account, token), remaining);
        Ok(())
    }

    fn debit_onchain(
        &mut self,
        account: &str,
        token: &str,
        quantity: Currency,
        args: &[String],
    ) -> Result<(), Error> {
        let balance = self.onchain_balance(account, token);
        let remaining = balance
            .checked_sub(quantity)
            .ok_or_else(|| failed(args, format!("insufficient onchain {token} balance")))?;
        self.onchain.insert(Self::key(account, token), remaining);
        Ok(())
    }

    fn withdraw(
        &mut self,
        account: &str,
        token: &str,
        quantity: Currency,
        args: &[String],
    ) -> Result<(), Error> {
        self.debit(account, token, quantity, args)?;
        let onchain = self.onchain_balance(account, token);
        self.onchain
            .insert(Self::key(account, token), onchain.saturating_add(quantity));
        Ok(())
    }

    fn place_bid(
        &mut self,
        mut bid: RestingOrder,
        behaviour: Behaviour,
        args: &[String],
    ) -> Result<(), Error> {
        let reserved = value(bid.quantity, bid.price);
        self.debit(&bid.account, &bid.quote, reserved, args)?;

        while behaviour != Behaviour::NoSettlement && bid.quantity > 0 {
            // Lowest price first, earliest first among equal prices.
            let best = self
                .asks
                .iter()
                .enumerate()
                .filter(|(_, ask)| ask.base == bid.base && ask.quote == bid.quote)
                .min_by_key(|(_, ask)| ask.price)
                .map(|(index, ask)| (index, ask.price));
            let Some((index, price)) = best.filter(|(_, price)| *price <= bid.price) else {
                break;
            };

            let ask = &mut self.asks[index];
            let traded = bid.quantity.min(ask.quantity);
            ask.quantity -= traded;
            bid.quantity -= traded;
            let seller = ask.account.clone();
            if ask.quantity == 0 {
                self.asks.remove(index);
            }

            let paid = value(traded, price);
            self.credit(&seller, &bid.quote, paid);
            self.credit(&bid.account, &bid.base, traded);
            self.credit(&bid.account, &bid.quote, value(traded, bid.price) - paid);
        }

        if bid.quantity > 0 {
            self.bids.push(bid);
        }
        Ok(())
    }

    fn place_ask(
        &mut self,
        mut ask: RestingOrder,
        behaviour: Behaviour,
        args: &[String],
    ) -> Result<(), Error> {
        self.debit(&ask.account, &ask.base, ask.quantity, args)?;

        while behaviour != Behaviour::NoSettlement && ask.quantity > 0 {
            // Highest price first, earliest first among equal prices.
            let best = self
                .bids
                .iter()
                .enumerate()
                .filter(|(_, bid)| bid.base == ask.base && bid.quote == ask.quote)
                .min_by_key(|(_, bid)| std::cmp::Reverse(bid.price))
                .map(|(index, bid)| (index, bid.price));
            let Some((index, price)) = best.filter(|(_, price)| *price >= ask.price) else {
                break;
            };

            let bid = &mut self.bids[index];
            let traded = ask.quantity.min(bid.quantity);
            bid.quantity -= traded;
            ask.quantity -= traded;
            let buyer = bid.account.clone();
            if bid.quantity == 0 {
                self.bids.remove(index);
            }

            self.credit(&ask.account, &ask.quote, value(traded, price));
            self.credit(&buyer, &ask.base, traded);
        }

        if ask.quantity > 0 {
            self.asks.push(ask);
        }
        Ok(())
    }

    fn cancel(&mut self, account: &str, order_id: &str, args: &[String]) -> Result<(), Error> {
        let matches = |order: &RestingOrder| order.id == order_id && order.account == account;
        if let Some(index) = self.bids.iter().position(matches) {
            let bid = self.bids.remove(index);
            self.credit(&bid.account, &bid.quote, value(bid.quantity, bid.price));
            return Ok(());
        }
        if let Some(index) = self.asks.iter().position(matches) {
            let ask = self.asks.remove(index);
            self.credit(&ask.account, &ask.base, ask.quantity);
            return Ok(());
        }
        Err(failed(args, format!("no open order {order_id}")))
    }
}

impl CommandRunner for FakeExchange {
    async fn run(&self, args: &[String]) -> Result<String, Error> {
        self.handle(args)
    }
}

/// Restarts a [`FakeExchange`] in place.
pub struct FakeRestart<'a>(pub &'a FakeExchange);

impl Restart for FakeRestart<'_> {
    async fn restart(&mut self) -> Result<(), ScenarioError> {
        self.0.restart();
        Ok(())
    }
}
