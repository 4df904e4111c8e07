use alloy::primitives::{Bytes, TxHash, U256};
use chrono::{DateTime, Utc};
use eyre::Result;
use tracing::{info, warn};

use super::{ActionContext, approve_unlimited_if_needed};
use crate::amounts::{STABLECOIN_DECIMALS, display_units, to_base_units};
use crate::contracts::{
    IUniversalRouter, UNIVERSAL_ROUTER_ADDRESS, USDT_ADDRESS, V3_SWAP_EXACT_IN, call_request,
    usdt_to_usdc_swap_input,
};
use crate::retry::run_with_retry;

/// Allowance the router needs before a swap is attempted (1 USDT).
const ROUTER_ALLOWANCE_FLOOR: u64 = 1_000_000;

pub async fn swap_usdt_to_usdc(ctx: &ActionContext<'_>) {
    let min_balance = match to_base_units(&ctx.config.usdt.min_swap_balance, STABLECOIN_DECIMALS) {
        Ok(min) => min,
        Err(e) => {
            tracing::error!(error = %e, "Invalid minimum swap balance");
            return;
        }
    };

    let result = run_with_retry(ctx.retry, "swap", ctx.config.retry_delay(), |_| {
        attempt_swap(ctx, min_balance)
    })
    .await;

    if let Ok(Some(hash)) = result {
        info!("Successfully swapped USDT to USDC. Transaction Hash: {}", hash);
    }
}

/// `Ok(None)` when the balance is too low to bother swapping.
async fn attempt_swap(ctx: &ActionContext<'_>, min_balance: U256) -> Result<Option<TxHash>> {
    let balance = ctx.client.token_balance(USDT_ADDRESS).await?;
    info!("USDT balance: {} USDT", display_units(balance, STABLECOIN_DECIMALS));
    if balance < min_balance {
        warn!(
            "Insufficient USDT balance for swap. Required: {} USDT",
            display_units(min_balance, STABLECOIN_DECIMALS)
        );
        return Ok(None);
    }

    let allowance = ctx.client.allowance(USDT_ADDRESS, UNIVERSAL_ROUTER_ADDRESS).await?;
    if allowance < U256::from(ROUTER_ALLOWANCE_FLOOR) {
        warn!("Insufficient allowance. Approving USDT...");
        approve_unlimited_if_needed(ctx, USDT_ADDRESS, UNIVERSAL_ROUTER_ADDRESS).await?;
    }

    info!("Attempting to swap USDT to USDC for address: {}", ctx.client.address());
    let execute = IUniversalRouter::executeCall {
        commands: Bytes::from(vec![V3_SWAP_EXACT_IN]),
        inputs: vec![usdt_to_usdc_swap_input(ctx.client.address())],
        deadline: swap_deadline(Utc::now(), ctx.config.swap_deadline_secs),
    };
    let tx = call_request(UNIVERSAL_ROUTER_ADDRESS, execute);

    Ok(Some(ctx.client.send(tx).await?))
}

fn swap_deadline(now: DateTime<Utc>, window_secs: u64) -> U256 {
    U256::from((now.timestamp().max(0) as u64).saturating_add(window_secs))
}
