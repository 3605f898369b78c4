//! Common utility and helper functions that are used across the project

use alloy_primitives::{Address, U256};

use super::error::{arithmetic_err, RouterResult};
use crate::constants::{max_bps, scale};

/// Returns `amount * numerator / denominator` with overflow and
/// division-by-zero checks.
pub fn mul_div(amount: U256, numerator: U256, denominator: U256) -> RouterResult<U256> {
    amount
        .checked_mul(numerator)
        .ok_or_else(|| arithmetic_err("mul_div numerator overflowed."))?
        .checked_div(denominator)
        .ok_or_else(|| arithmetic_err("mul_div denominator was zero."))
}

/// Returns the `bps` fraction of `amount`.
pub fn apply_bps(amount: U256, bps: u64) -> RouterResult<U256> {
    mul_div(amount, U256::from(bps), max_bps())
}

/// Converts a share balance into underlying units at the given
/// price-per-share (1e18 fixed point).
pub fn shares_to_value(shares: U256, price_per_share: U256) -> RouterResult<U256> {
    mul_div(shares, price_per_share, scale())
}

/// Converts an underlying amount into shares at the given price-per-share
/// (1e18 fixed point).
pub fn value_to_shares(value: U256, price_per_share: U256) -> RouterResult<U256> {
    mul_div(value, scale(), price_per_share)
}

/// Derives the deterministic address of the strategy instance stored under
/// `key`. The key is embedded in the low bytes of the address.
pub fn strategy_address(key: u32) -> Address {
    let mut bytes = [0u8; 20];
    bytes[0] = 0x57; // 'S', distinguishes strategy addresses in the ledgers
    bytes[16..].copy_from_slice(&key.to_be_bytes());
    Address::from(bytes)
}
