use std::sync::atomic::{AtomicBool, Ordering};

use alloy::primitives::{TxHash, U256};
use bigdecimal::BigDecimal;
use eyre::Result;
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::{ActionContext, approve_unlimited_if_needed, ensure_allowance};
use crate::amounts::{STABLECOIN_DECIMALS, display_units, to_base_units};
use crate::contracts::{
    COMPTROLLER_ADDRESS, IComptroller, ILendingMarket, USDC_ADDRESS, USDC_MARKET_ADDRESS, USDC_SUPPLY_ALLOWANCE,
    USDT_ADDRESS, USDT_MARKET_ADDRESS, call_request,
};
use crate::error::TxError;
use crate::retry::run_with_retry;

fn stable_amount(value: &BigDecimal, what: &str) -> Option<U256> {
    match to_base_units(value, STABLECOIN_DECIMALS) {
        Ok(amount) => Some(amount),
        Err(e) => {
            error!(error = %e, "Invalid {what} amount");
            None
        }
    }
}

/// Approve if needed, supply USDC to its market, then make sure the market is
/// entered as collateral.
pub async fn supply_usdc(ctx: &ActionContext<'_>) {
    let Some(amount) = stable_amount(&ctx.config.usdc.supply_amount, "supply") else {
        return;
    };

    let result = run_with_retry(ctx.retry, "supplying USDC", ctx.config.retry_delay(), |_| async move {
        ensure_supply_allowance(ctx, amount).await?;
        supply_once(ctx, amount).await?;
        ensure_collateral(ctx).await;
        Ok::<_, eyre::Report>(())
    })
    .await;

    if result.is_ok() {
        info!("Supply process finished");
    }
}

/// Supply USDC `repeated_supply_count` times, then enable collateral. A
/// failed approval is logged and the supplies are still attempted.
pub async fn supply_usdc_repeated(ctx: &ActionContext<'_>) {
    let Some(amount) = stable_amount(&ctx.config.usdc.repeated_supply_amount, "repeated supply") else {
        return;
    };
    let count = ctx.config.usdc.repeated_supply_count;

    if let Err(e) = ensure_supply_allowance(ctx, amount).await {
        error!(error = %e, "Error approving USDC, continuing with supplies");
    }

    for n in 1..=count {
        let result = run_with_retry(ctx.retry, "supplying USDC", ctx.config.retry_delay(), |_| {
            supply_once(ctx, amount)
        })
        .await;
        match result {
            Ok(hash) => info!("Successfully supplied USDC {}/{} times. Transaction Hash: {}", n, count, hash),
            Err(_) => {
                error!("Stopping repeated supply after {}/{} successful supplies", n - 1, count);
                return;
            }
        }
        sleep(ctx.config.retry_delay()).await;
    }

    ensure_collateral(ctx).await;
}

async fn ensure_supply_allowance(ctx: &ActionContext<'_>, amount: U256) -> Result<()> {
    ensure_allowance(
        ctx,
        USDC_ADDRESS,
        USDC_MARKET_ADDRESS,
        amount,
        U256::from(USDC_SUPPLY_ALLOWANCE),
    )
    .await
}

async fn supply_once(ctx: &ActionContext<'_>, amount: U256) -> Result<TxHash> {
    info!(
        "Supplying {} USDC for address: {}",
        display_units(amount, STABLECOIN_DECIMALS),
        ctx.client.address()
    );
    let tx = call_request(USDC_MARKET_ADDRESS, ILendingMarket::mintCall { amount });
    let hash = ctx.client.send(tx).await?;
    info!("Successfully supplied USDC. Transaction Hash: {}", hash);
    Ok(hash)
}

/// Positive account liquidity means the collateral market is already entered.
/// Lookup failures count as "not enabled".
async fn collateral_enabled(ctx: &ActionContext<'_>) -> bool {
    match ctx.client.account_liquidity().await {
        Ok(liquidity) => !liquidity.is_zero(),
        Err(e) => {
            error!(error = %e, "Error checking collateral status");
            false
        }
    }
}

async fn ensure_collateral(ctx: &ActionContext<'_>) {
    if collateral_enabled(ctx).await {
        info!("Collateral already enabled. Skipping enablement");
        return;
    }

    warn!("Collateral not enabled. Enabling collateral for address: {}", ctx.client.address());
    let tx = call_request(
        COMPTROLLER_ADDRESS,
        IComptroller::enterMarketsCall {
            cTokens: vec![USDC_MARKET_ADDRESS],
        },
    );
    match ctx.client.send(tx).await {
        Ok(hash) => info!("Successfully enabled collateral. Transaction Hash: {}", hash),
        Err(e) => error!(error = %e, "Error enabling collateral"),
    }
}

pub async fn borrow(ctx: &ActionContext<'_>) {
    let Some(amount) = stable_amount(&ctx.config.usdt.borrow_amount, "borrow") else {
        return;
    };

    let result = run_with_retry(ctx.retry, "borrowing", ctx.config.retry_delay(), |_| {
        attempt_borrow(ctx, amount)
    })
    .await;

    if let Ok(hash) = result {
        info!("Successfully borrowed. Transaction Hash: {}", hash);
    }
}

/// A borrow only counts once the USDT balance has actually grown.
async fn attempt_borrow(ctx: &ActionContext<'_>, amount: U256) -> Result<TxHash> {
    info!(
        "Attempting to borrow {} USDT for address: {}",
        display_units(amount, STABLECOIN_DECIMALS),
        ctx.client.address()
    );
    let before = ctx.client.token_balance(USDT_ADDRESS).await?;
    info!("Initial USDT balance: {}", display_units(before, STABLECOIN_DECIMALS));

    let tx = call_request(USDT_MARKET_ADDRESS, ILendingMarket::borrowCall { borrowAmount: amount });
    let hash = ctx.client.send(tx).await?;

    sleep(ctx.config.settle_delay()).await;
    let after = ctx.client.token_balance(USDT_ADDRESS).await?;
    info!("Final USDT balance: {}", display_units(after, STABLECOIN_DECIMALS));

    if after > before {
        Ok(hash)
    } else {
        Err(TxError::BalanceNotIncreased { hash, before, after }.into())
    }
}

/// Repay the configured USDT amount. The first failure triggers a one-off
/// unlimited approval for the market before retrying.
pub async fn repay(ctx: &ActionContext<'_>) {
    let Some(amount) = stable_amount(&ctx.config.usdt.repay_amount, "repay") else {
        return;
    };
    let approval_flag = AtomicBool::new(false);
    let approval_done = &approval_flag;

    let result = run_with_retry(ctx.retry, "repaying", ctx.config.retry_delay(), |_| {
        async move {
            info!(
                "Attempting to repay {} USDT for address: {}",
                display_units(amount, STABLECOIN_DECIMALS),
                ctx.client.address()
            );
            let tx = call_request(USDT_MARKET_ADDRESS, ILendingMarket::repayBorrowCall { repayAmount: amount });
            match ctx.client.send(tx).await {
                Ok(hash) => Ok(hash),
                Err(e) => {
                    if !approval_done.swap(true, Ordering::Relaxed) {
                        warn!(error = %e, "Repay failed, approving USDT before retrying");
                        if let Err(approve_err) =
                            approve_unlimited_if_needed(ctx, USDT_ADDRESS, USDT_MARKET_ADDRESS).await
                        {
                            error!(error = %approve_err, "Error approving unlimited amount");
                        }
                    }
                    Err(e)
                }
            }
        }
    })
    .await;

    if let Ok(hash) = result {
        info!("Successfully repaid. Transaction Hash: {}", hash);
    }
}

pub async fn borrow_and_repay(ctx: &ActionContext<'_>) {
    borrow(ctx).await;
    sleep(ctx.config.settle_delay()).await;
    repay(ctx).await;
}
