//! Router Strategy Constants

use alloy_primitives::U256;

/// Scale used for fixed point arithmetic
pub const SCALE: u128 = 1_000_000_000_000_000_000; // e18
pub fn scale() -> U256 {
    U256::from(SCALE)
}

/// Basis point denominator
pub const MAX_BPS: u64 = 10_000;
pub fn max_bps() -> U256 {
    U256::from(MAX_BPS)
}

/// Cool-down after an exchange before the routed assets may be withdrawn
/// or moved again, denominated in seconds. Exchange-side settlement must
/// finalize first.
pub const EXCHANGE_SETTLEMENT_WINDOW: u64 = 360;

/// Cool-down after an exchange before freshly converted assets may be
/// deposited into the destination venue, denominated in seconds.
pub const VENUE_ENTRY_WINDOW: u64 = 3_600;

/// Default liquid reserve kept outside the destination venue, relative to
/// the outstanding debt. 100 bps => 1%.
pub const DEFAULT_BUFFER_BPS: u64 = 100;

/// Default maximum acceptable slippage on a single liquidation, in bps.
pub const DEFAULT_MAX_LOSS_BPS: u64 = 1;

/// Residual balances below this many base units count as dust on an
/// 18-decimal asset and are ignored by full unwinds.
pub const DUST_THRESHOLD: u64 = 10_000;
pub fn dust_threshold() -> U256 {
    U256::from(DUST_THRESHOLD)
}

/// Margin the post-mint collateralization ratio must keep above the
/// protocol issuance ratio before new synthetic debt is minted. 1_000 bps
/// => 10%.
pub const RATIO_MARGIN_BPS: u64 = 1_000;
