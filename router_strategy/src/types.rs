//! Shared types for the router strategy

use alloy_primitives::{Address, U256};
use serde::Serialize;

/// Where an instance came from. Clones share the strategy logic but own
/// independent state, and may not be cloned again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Provenance {
    #[default]
    Original,
    Clone,
}

/// Operating mode of an instance. The transition to `EmergencyExit` is
/// one-way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Mode {
    #[default]
    Normal,
    EmergencyExit,
}

/// Result of one full harvest cycle, as reported to the source pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct HarvestReport {
    pub profit: U256,
    pub loss: U256,
    pub debt_payment: U256,
    /// Debt still owed to the source pool after the report
    pub debt_outstanding: U256,
}

/// Result of a source-pool withdrawal request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct WithdrawalOutcome {
    /// Want-token amount made liquid and handed back to the pool
    pub liquidated: U256,
    /// Loss realized while liquidating
    pub loss: U256,
}

/// Records emitted by the strategy for external observers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum StrategyEvent {
    Harvested {
        strategy: Address,
        profit: U256,
        loss: U256,
        debt_payment: U256,
        debt_outstanding: U256,
    },
    Cloned {
        clone: Address,
    },
    FullCloned {
        clone: Address,
    },
}

/// Read-only view over a stored strategy instance.
#[derive(Clone, Debug, Serialize)]
pub struct StrategyQuery {
    pub key: u32,
    pub address: Address,
    pub name: String,
    pub provenance: Provenance,
    pub mode: Mode,
    pub synth_key: Option<String>,
    pub total_debt_known: U256,
    pub buffer_bps: u64,
    pub max_loss_bps: u64,
    pub fee_loss_tolerance: U256,
    pub do_health_check: bool,
    pub last_exchange_at: Option<u64>,
    pub last_harvest_at: Option<u64>,
}
