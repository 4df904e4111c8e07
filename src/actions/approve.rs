use alloy::primitives::{Address, U256};
use eyre::Result;
use tracing::{info, warn};

use super::ActionContext;
use crate::contracts::{IERC20, call_request};

/// Grant `spender` an unlimited allowance unless it already has one.
pub async fn approve_unlimited_if_needed(
    ctx: &ActionContext<'_>,
    token: Address,
    spender: Address,
) -> Result<()> {
    let current = ctx.client.allowance(token, spender).await?;
    if current == U256::MAX {
        info!("Unlimited approval already set for spender: {}", spender);
        return Ok(());
    }

    if current.is_zero() {
        warn!(
            "No allowance set. Approving unlimited amount for spender: {} from address: {}",
            spender,
            ctx.client.address()
        );
    } else {
        warn!(
            "Current allowance is {}. Approving unlimited amount for spender: {} from address: {}",
            current,
            spender,
            ctx.client.address()
        );
    }

    approve(ctx, token, spender, U256::MAX).await
}

/// Approve `grant` for `spender` when the current allowance is below `required`.
pub async fn ensure_allowance(
    ctx: &ActionContext<'_>,
    token: Address,
    spender: Address,
    required: U256,
    grant: U256,
) -> Result<()> {
    let current = ctx.client.allowance(token, spender).await?;
    if current >= required {
        return Ok(());
    }
    warn!("Insufficient allowance ({} < {}). Approving {}...", current, required, token);
    approve(ctx, token, spender, grant).await
}

async fn approve(ctx: &ActionContext<'_>, token: Address, spender: Address, amount: U256) -> Result<()> {
    let tx = call_request(token, IERC20::approveCall { spender, value: amount });
    let hash = ctx.client.send(tx).await?;
    info!("Successfully approved {} for {}. Transaction Hash: {}", token, spender, hash);
    Ok(())
}
