//! On-chain actions run for a single account.
//!
//! Every public action owns its retry loop and never fails the cycle: errors
//! are logged and the runner moves on to the next action.

mod approve;
mod lending;
mod native;
mod swap;

#[cfg(test)]
pub(crate) mod testing;

pub use approve::{approve_unlimited_if_needed, ensure_allowance};
pub use lending::{borrow, borrow_and_repay, repay, supply_usdc, supply_usdc_repeated};
pub use native::{transfer_to_self, unwrap_eth, wrap_eth};
pub use swap::swap_usdt_to_usdc;

use crate::client::Chain;
use crate::config::Config;
use crate::retry::RetryPolicy;

pub struct ActionContext<'a> {
    pub client: &'a dyn Chain,
    pub config: &'a Config,
    pub retry: RetryPolicy,
}

impl<'a> ActionContext<'a> {
    pub fn new(client: &'a dyn Chain, config: &'a Config, retry: RetryPolicy) -> Self {
        Self { client, config, retry }
    }
}
