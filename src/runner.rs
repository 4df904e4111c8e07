use std::future::Future;

use eyre::{Result, WrapErr};
use reqwest::{Client, Url};
use tracing::{Instrument, error, info, info_span};

use crate::accounts::{Account, AccountBatch};
use crate::actions::{self, ActionContext};
use crate::amounts::random_eth_amount;
use crate::client::{Chain, ChainClient};
use crate::config::Config;
use crate::proxy::{ProxyPool, http_client};
use crate::schedule::{describe_wait, local_time_label, network_now, next_delay};
use crate::selection::{RunOptions, TxKind};
use crate::tasks::TaskClient;

pub struct Runner {
    config: Config,
    options: RunOptions,
    batch: AccountBatch,
    proxies: Option<ProxyPool>,
    rpc_url: Url,
    time_client: Client,
}

impl Runner {
    pub fn new(config: Config, options: RunOptions, batch: AccountBatch, proxies: Option<ProxyPool>) -> Result<Self> {
        let rpc_url = Url::parse(&config.rpc_url).wrap_err_with(|| format!("invalid RPC URL {}", config.rpc_url))?;
        let time_client = http_client(None)?;
        Ok(Self {
            config,
            options,
            batch,
            proxies,
            rpc_url,
            time_client,
        })
    }

    /// Run cycles until Ctrl-C, or a single cycle with `once`.
    pub async fn run(&self) -> Result<()> {
        self.run_until(tokio::signal::ctrl_c).await
    }

    /// Run cycles until a future produced by `shutdown` resolves. A fresh
    /// future is raced against every cycle and every wait.
    pub async fn run_until<F, Fut>(&self, mut shutdown: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future,
    {
        let mut first = true;
        loop {
            if first {
                info!("Starting the script");
            } else {
                info!("Resuming cycle...");
            }
            first = false;

            tokio::select! {
                _ = self.run_cycle() => {}
                _ = shutdown() => {
                    info!("Interrupted during cycle, shutting down");
                    return Ok(());
                }
            }
            info!("Script cycle complete");

            if self.options.once {
                return Ok(());
            }

            let now = network_now(&self.time_client, &self.config.time_api_url).await;
            let delay = next_delay(self.options.schedule, &self.config, now);
            info!("Waiting for the next cycle in {}...", describe_wait(delay));
            if let Ok(step) = chrono::TimeDelta::from_std(delay) {
                info!("Next cycle will run at local time: {}", local_time_label(now + step));
            }

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown() => {
                    info!("Interrupted, shutting down");
                    return Ok(());
                }
            }
        }
    }

    async fn run_cycle(&self) {
        for (index, e) in &self.batch.rejected {
            error!(account = index, error = %e, "Skipping account");
        }
        for account in &self.batch.accounts {
            let span = info_span!("account", index = account.index, address = %account.address());
            self.process_account(account).instrument(span).await;
        }
    }

    async fn process_account(&self, account: &Account) {
        let client = ChainClient::connect(&self.rpc_url, account.clone(), self.config.receipt_timeout());
        self.run_actions(&client, account).await;
    }

    /// Selected actions for one account, always in menu order with task
    /// claiming just before the repeated supply.
    async fn run_actions(&self, client: &dyn Chain, account: &Account) {
        let options = &self.options;
        let ctx = ActionContext::new(client, &self.config, options.retry);

        if options.runs(TxKind::SendToSelf) {
            if let Some(amount) = self.sample_amount() {
                actions::transfer_to_self(&ctx, amount).await;
            }
        }

        if options.runs(TxKind::WrapUnwrap) || options.runs(TxKind::Wrap) {
            if let Some(amount) = self.sample_amount() {
                actions::wrap_eth(&ctx, amount).await;
                if options.runs(TxKind::WrapUnwrap) {
                    actions::unwrap_eth(&ctx, amount).await;
                }
            }
        }

        if options.runs(TxKind::Unwrap) {
            if let Some(amount) = self.sample_amount() {
                actions::unwrap_eth(&ctx, amount).await;
            }
        }

        if options.runs(TxKind::SwapUsdt) {
            actions::swap_usdt_to_usdc(&ctx).await;
        }

        if options.runs(TxKind::SupplyUsdc) {
            actions::supply_usdc(&ctx).await;
        }

        if options.runs(TxKind::BorrowAndRepay) {
            actions::borrow_and_repay(&ctx).await;
        }

        if options.runs(TxKind::Borrow) {
            actions::borrow(&ctx).await;
        }

        if options.runs(TxKind::Repay) {
            actions::repay(&ctx).await;
        }

        if options.mode.claims_tasks() {
            self.claim_tasks(account).await;
        }

        if options.runs(TxKind::SupplyUsdcRepeated) {
            actions::supply_usdc_repeated(&ctx).await;
        }
    }

    async fn claim_tasks(&self, account: &Account) {
        let proxy = self.proxies.as_ref().and_then(|pool| pool.for_slot(account.slot()));
        if let Some(proxy) = proxy {
            info!(proxy, "Fetching tasks for address: {}", account.address());
        }
        let http = match http_client(proxy) {
            Ok(http) => http,
            Err(e) => {
                error!(error = %e, "Cannot build HTTP client for task claiming");
                return;
            }
        };
        let summary = TaskClient::new(http, self.config.graphql_url.clone())
            .process_tasks(account.address())
            .await;
        tracing::debug!(claimed = summary.claimed, failed = summary.failed, "Task claim summary");
    }

    fn sample_amount(&self) -> Option<alloy::primitives::U256> {
        match random_eth_amount(&self.config.eth_amount_range, &mut rand::rng()) {
            Ok(amount) => Some(amount),
            Err(e) => {
                error!(error = %e, "Cannot sample ETH amount");
                None
            }
        }
    }
}
