use alloy::primitives::U256;
use alloy::primitives::utils::format_units;
use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use eyre::{Result, eyre};
use rand::Rng;

use crate::config::AmountRange;

/// ETH amounts are quantised to 9 decimals, i.e. whole gwei.
pub const ETH_QUANTUM_DECIMALS: u32 = 9;
pub const STABLECOIN_DECIMALS: u32 = 6;

const WEI_PER_GWEI: u64 = 1_000_000_000;

/// Convert a decimal amount to integer base units, rounding half-up at the
/// token's precision.
pub fn to_base_units(value: &BigDecimal, decimals: u32) -> Result<U256> {
    let scaled = value * BigDecimal::from(10u64.pow(decimals));
    let rounded = scaled.with_scale_round(0, RoundingMode::HalfUp);
    rounded
        .to_u64()
        .map(U256::from)
        .ok_or_else(|| eyre!("amount {value} does not fit in base units with {decimals} decimals"))
}

pub fn display_units(value: U256, decimals: u32) -> String {
    format_units(value, decimals as u8).unwrap_or_else(|_| value.to_string())
}

pub fn display_eth(wei: U256) -> String {
    display_units(wei, 18)
}

/// Sample an ETH amount in wei uniformly from `range`, at gwei granularity.
pub fn random_eth_amount<R: Rng + ?Sized>(range: &AmountRange, rng: &mut R) -> Result<U256> {
    let min = gwei(&range.min)?;
    let max = gwei(&range.max)?;
    if min > max {
        return Err(eyre!("empty amount range {}..={}", range.min, range.max));
    }
    let sampled = rng.random_range(min..=max);
    Ok(U256::from(sampled) * U256::from(WEI_PER_GWEI))
}

/// The share of `amount` to unwrap, quantised the same way as sampled amounts.
pub fn unwrap_amount(amount: U256, percentage: &BigDecimal) -> Result<U256> {
    let amount_gwei: u64 = (amount / U256::from(WEI_PER_GWEI))
        .try_into()
        .map_err(|_| eyre!("amount {amount} is too large to unwrap"))?;
    let share = BigDecimal::from(amount_gwei) * percentage;
    let share_gwei = share
        .with_scale_round(0, RoundingMode::HalfUp)
        .to_u64()
        .ok_or_else(|| eyre!("unwrap share {share} is out of range"))?;
    Ok(U256::from(share_gwei) * U256::from(WEI_PER_GWEI))
}

fn gwei(value: &BigDecimal) -> Result<u64> {
    to_base_units(value, ETH_QUANTUM_DECIMALS)?
        .try_into()
        .map_err(|_| eyre!("amount {value} is out of range"))
}
