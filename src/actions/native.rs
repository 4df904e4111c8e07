use alloy::network::TransactionBuilder;
use alloy::primitives::U256;
use alloy::rpc::types::TransactionRequest;
use bigdecimal::BigDecimal;
use tracing::{debug, info};

use super::ActionContext;
use crate::amounts::{display_eth, unwrap_amount};
use crate::contracts::{IWETH, WETH_ADDRESS, call_request};
use crate::retry::run_with_retry;

pub async fn transfer_to_self(ctx: &ActionContext<'_>, amount: U256) {
    let address = ctx.client.address();
    let result = run_with_retry(ctx.retry, "self-transfer", ctx.config.retry_delay(), |_| async move {
        info!("Transferring {} ETH to self: {}", display_eth(amount), address);
        if let Ok(balance) = ctx.client.native_balance().await {
            debug!(balance = %display_eth(balance), "Native balance");
        }
        let tx = TransactionRequest::default().with_to(address).with_value(amount);
        ctx.client.send(tx).await
    })
    .await;

    if let Ok(hash) = result {
        info!("Transfer to self successful. Transaction Hash: {}", hash);
    }
}

pub async fn wrap_eth(ctx: &ActionContext<'_>, amount: U256) {
    let result = run_with_retry(ctx.retry, "wrapping ETH", ctx.config.retry_delay(), |_| {
        let tx = call_request(WETH_ADDRESS, IWETH::depositCall {}).with_value(amount);
        async move {
            info!("Wrapping {} ETH for address: {}", display_eth(amount), ctx.client.address());
            ctx.client.send(tx).await
        }
    })
    .await;

    if let Ok(hash) = result {
        info!("Successfully wrapped ETH. Transaction Hash: {}", hash);
    }
}

/// Unwrap the configured share of `amount`.
pub async fn unwrap_eth(ctx: &ActionContext<'_>, amount: U256) {
    let percentage = &ctx.config.unwrap_percentage;
    let share = match unwrap_amount(amount, percentage) {
        Ok(share) => share,
        Err(e) => {
            tracing::error!(error = %e, "Cannot compute unwrap amount");
            return;
        }
    };

    let result = run_with_retry(ctx.retry, "unwrapping WETH", ctx.config.retry_delay(), |_| {
        let tx = call_request(WETH_ADDRESS, IWETH::withdrawCall { wad: share });
        async move {
            info!(
                "Unwrapping {}% of WETH for address: {}, Amount: {} ETH",
                (percentage * BigDecimal::from(100)).normalized(),
                ctx.client.address(),
                display_eth(share)
            );
            ctx.client.send(tx).await
        }
    })
    .await;

    if let Ok(hash) = result {
        info!("Successfully unwrapped WETH. Transaction Hash: {}", hash);
    }
}
