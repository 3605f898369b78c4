//! Mutable strategy data

use alloy_primitives::{Address, U256};

use crate::{
    collaborators::{Handle, HealthCheck, LossChecker},
    constants::{DEFAULT_BUFFER_BPS, DEFAULT_MAX_LOSS_BPS},
    types::Mode,
};

/// Struct containing all mutable data of a strategy instance
#[derive(Clone)]
pub struct StrategyData {
    /// Keeper role address, changeable by governance
    pub keeper: Address,
    /// Normal operation or one-way emergency unwind
    pub mode: Mode,
    /// Cached mirror of the source pool's recorded outstanding debt,
    /// refreshed on every successful report
    pub total_debt_known: U256,
    /// Liquid want reserve relative to the outstanding debt, in bps
    pub buffer_bps: u64,
    /// Maximum acceptable slippage on a single liquidation, in bps
    pub max_loss_bps: u64,
    /// Maximum predicted fee-only loss a harvest may proceed through
    pub fee_loss_tolerance: U256,
    /// Whether the pluggable health check runs on the next harvest
    pub do_health_check: bool,
    /// Pluggable sanity check on the harvest result
    pub health_check: Option<Handle<dyn HealthCheck>>,
    /// External predictor for fee-induced losses
    pub loss_checker: Option<Handle<dyn LossChecker>>,
}

impl Default for StrategyData {
    fn default() -> Self {
        Self {
            keeper: Address::ZERO,
            mode: Mode::Normal,
            total_debt_known: U256::ZERO,
            buffer_bps: DEFAULT_BUFFER_BPS,
            max_loss_bps: DEFAULT_MAX_LOSS_BPS,
            // Unbounded until governance deliberately tightens it
            fee_loss_tolerance: U256::MAX,
            do_health_check: true,
            health_check: None,
            loss_checker: None,
        }
    }
}

impl StrategyData {
    /// Sets the keeper role address.
    pub fn keeper(&mut self, keeper: Address) -> &mut Self {
        self.keeper = keeper;
        self
    }

    /// Sets the buffer size in bps.
    pub fn buffer_bps(&mut self, buffer_bps: u64) -> &mut Self {
        self.buffer_bps = buffer_bps;
        self
    }

    /// Sets the maximum liquidation loss in bps.
    pub fn max_loss_bps(&mut self, max_loss_bps: u64) -> &mut Self {
        self.max_loss_bps = max_loss_bps;
        self
    }

    /// Sets the fee-loss tolerance in absolute want units.
    pub fn fee_loss_tolerance(&mut self, tolerance: U256) -> &mut Self {
        self.fee_loss_tolerance = tolerance;
        self
    }

    /// Sets the health check collaborator.
    pub fn health_check(&mut self, health_check: Option<Handle<dyn HealthCheck>>) -> &mut Self {
        self.health_check = health_check;
        self
    }

    /// Sets the loss checker collaborator.
    pub fn loss_checker(&mut self, loss_checker: Option<Handle<dyn LossChecker>>) -> &mut Self {
        self.loss_checker = loss_checker;
        self
    }
}
