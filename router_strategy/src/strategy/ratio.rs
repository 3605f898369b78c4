//! Collateralization-ratio guard for the synthetic-asset leg
//!
//! The exchange protocol liquidates positions whose collateral/debt ratio
//! falls below its issuance ratio. The guard keeps the strategy from
//! minting new synthetic debt near that boundary and from burning when no
//! free collateral is left. A failed check skips the allocation step for
//! the cycle; the rest of the harvest still runs and reports.

use crate::{
    collaborators::SynthExchange,
    constants::{MAX_BPS, RATIO_MARGIN_BPS},
    utils::common::mul_div,
    utils::error::RouterResult,
};
use alloy_primitives::U256;

pub struct RatioGuard;

impl RatioGuard {
    /// Minting new synthetic debt is allowed only while the live ratio
    /// clears the issuance ratio with `RATIO_MARGIN_BPS` of headroom.
    pub fn clears_mint(exchange: &dyn SynthExchange) -> RouterResult<bool> {
        let floor = mul_div(
            exchange.issuance_ratio(),
            U256::from(MAX_BPS + RATIO_MARGIN_BPS),
            U256::from(MAX_BPS),
        )?;
        Ok(exchange.current_ratio() >= floor)
    }

    /// Burning synthetic debt requires free collateral, i.e. a live ratio
    /// at or above the issuance ratio.
    pub fn clears_burn(exchange: &dyn SynthExchange) -> bool {
        exchange.current_ratio() >= exchange.issuance_ratio()
    }
}
