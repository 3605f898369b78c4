//! Collaborator interfaces consumed by the strategy
//!
//! Every external system the strategy touches (source pool, destination
//! venue, synthetic-asset exchange, token ledgers, pluggable checkers and
//! the clock) is modeled as a capability trait injected at construction
//! time. The strategy never assumes exclusive access to a collaborator and
//! re-reads its state on every call instead of caching it across
//! operations.

use std::rc::Rc;

use alloy_primitives::{Address, U256};
use chrono::Utc;

use crate::utils::error::RouterResult;

/// Fungible token ledger (the want token).
pub trait TokenLedger {
    fn balance_of(&self, holder: Address) -> U256;
    fn transfer(&self, from: Address, to: Address, amount: U256) -> RouterResult<()>;
}

/// The pool that allocates capital to this strategy and tracks its
/// debt/profit/loss ledger.
pub trait SourcePool {
    /// Identity of the pool in the want-token ledger
    fn address(&self) -> Address;
    /// Governance role address, read fresh on every access check
    fn governance(&self) -> Address;
    /// Outstanding debt recorded for the strategy
    fn total_debt(&self, strategy: Address) -> U256;
    /// Debt the pool currently wants repaid
    fn debt_outstanding(&self, strategy: Address) -> U256;
    /// Commits one harvest cycle. Settles the profit, loss and debt-payment
    /// flows against the want ledger, extends fresh credit if the target
    /// allocation allows it, and returns the new outstanding debt.
    fn report(
        &self,
        strategy: Address,
        profit: U256,
        loss: U256,
        debt_payment: U256,
    ) -> RouterResult<U256>;
    /// Sets the strategy's target allocation to zero
    fn revoke_strategy(&self, strategy: Address);
    fn update_strategy_debt_ratio(&self, strategy: Address, bps: u64);
}

/// The yield-bearing pool capital is routed into.
pub trait DestinationVenue {
    /// Deposits the venue asset and returns the shares minted
    fn deposit(&self, from: Address, amount: U256) -> RouterResult<U256>;
    /// Redeems shares for the venue asset. The venue enforces `max_loss_bps`
    /// and rejects the call rather than absorbing excess slippage.
    fn withdraw(&self, holder: Address, shares: U256, max_loss_bps: u64) -> RouterResult<U256>;
    fn balance_of(&self, holder: Address) -> U256;
    /// Venue asset per share, 1e18 fixed point
    fn price_per_share(&self) -> U256;
    fn total_assets(&self) -> U256;
    fn transfer_shares(&self, from: Address, to: Address, shares: U256) -> RouterResult<()>;
}

/// Synthetic-asset exchange and issuance protocol, including the resolver
/// used to locate the synth token and the collateralization ratios the
/// RatioGuard consults.
pub trait SynthExchange {
    /// Resolves a synth key to the synth token address
    fn resolve(&self, key: &str) -> Option<Address>;
    /// Want per synth, 1e18 fixed point
    fn latest_price(&self) -> U256;
    /// Converts want into synth for `holder`; returns the synth received
    fn exchange_in(&self, holder: Address, want_amount: U256) -> RouterResult<U256>;
    /// Converts synth back into want for `holder`; returns the want received
    fn exchange_out(&self, holder: Address, synth_amount: U256) -> RouterResult<U256>;
    fn synth_balance_of(&self, holder: Address) -> U256;
    fn transfer_synth(&self, from: Address, to: Address, amount: U256) -> RouterResult<()>;
    /// Desired collateral/debt safety margin, 1e18 fixed point
    fn target_ratio(&self) -> U256;
    /// Live collateral/debt ratio at the current collateral price
    fn current_ratio(&self) -> U256;
    /// Protocol-mandated minimum ratio before liquidation risk
    fn issuance_ratio(&self) -> U256;
}

/// External predictor distinguishing fee-induced losses from genuine
/// strategy losses.
#[cfg_attr(test, mockall::automock)]
pub trait LossChecker {
    fn check(&self, profit: U256, loss: U256, strategy: Address) -> U256;
}

/// Default predictor: no fee-induced loss expected.
pub struct NoLossChecker;

impl LossChecker for NoLossChecker {
    fn check(&self, _profit: U256, _loss: U256, _strategy: Address) -> U256 {
        U256::ZERO
    }
}

/// Pluggable sanity check consulted after computing the harvest result.
#[cfg_attr(test, mockall::automock)]
pub trait HealthCheck {
    fn check(
        &self,
        profit: U256,
        loss: U256,
        debt_payment: U256,
        debt_outstanding: U256,
        total_debt: U256,
    ) -> bool;
}

/// Default health check: accepts every harvest result.
pub struct AlwaysHealthy;

impl HealthCheck for AlwaysHealthy {
    fn check(&self, _: U256, _: U256, _: U256, _: U256, _: U256) -> bool {
        true
    }
}

/// Wall-clock time source, read at call time. Call timing is adversarial
/// input, so every time-lock check re-reads the clock inside the
/// operation itself.
pub trait Clock {
    /// Seconds since the Unix epoch
    fn now(&self) -> u64;
}

/// System clock backed by `chrono`.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        Utc::now().timestamp() as u64
    }
}

/// Shared handle type for collaborators. Operations are strictly
/// serialized, so single-threaded reference counting suffices.
pub type Handle<T> = Rc<T>;
