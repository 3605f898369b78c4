//! The executable strategy wrapper that runs the harvest/accounting state
//! machine.
//!
//! Every operation materializes one of these from the stored record, runs
//! to completion, and writes back with `apply_change` only on success.
//! Failures drop the copy and leave the registry untouched, except that
//! the settlement lock is persisted as soon as an exchange happens.

use alloy_primitives::{Address, U256};

use crate::{
    collaborators::{Handle, HealthCheck, LossChecker, NoLossChecker},
    journal::{JournalEntry, LogType},
    state::{record_event, STRATEGY_STATE},
    types::{HarvestReport, Mode, StrategyEvent, WithdrawalOutcome},
    utils::{
        common::{apply_bps, mul_div, shares_to_value},
        error::{RouterError, RouterResult},
    },
};

use super::{data::StrategyData, lock::TimeLock, settings::StrategySettings};
use crate::constants::{scale, MAX_BPS};

pub struct ExecutableStrategy {
    /// Immutable settings and configurations
    pub settings: StrategySettings,
    /// Mutable state
    pub data: StrategyData,
    /// Cool-down windows
    pub lock: TimeLock,
}

impl ExecutableStrategy {
    pub fn new(settings: StrategySettings, data: StrategyData, lock: TimeLock) -> Self {
        Self {
            settings,
            data,
            lock,
        }
    }

    /// Writes the strategy back to the registry.
    pub(crate) fn apply_change(&self) {
        STRATEGY_STATE.with(|strategies| {
            strategies
                .borrow_mut()
                .insert(self.settings.key, self.into());
        });
    }

    /// Records an exchange and persists the restarted settlement window
    /// immediately. The exchange itself is irreversible, so the window
    /// must hold even when the surrounding cycle aborts afterwards.
    pub(super) fn note_exchange(&mut self) {
        let now = self.now();
        self.lock.mark_exchange(now);
        STRATEGY_STATE.with(|strategies| {
            if let Some(stored) = strategies.borrow_mut().get_mut(&self.settings.key) {
                stored.lock = self.lock;
            }
        });
    }

    pub(crate) fn now(&self) -> u64 {
        self.settings.clock.now()
    }

    pub(super) fn address(&self) -> Address {
        self.settings.address
    }

    // ---- roles ------------------------------------------------------

    /// Governance is owned by the source pool and re-read on every check.
    fn only_governance(&self, caller: Address) -> RouterResult<()> {
        if caller == self.settings.source_pool.governance() {
            Ok(())
        } else {
            Err(RouterError::Unauthorized)
        }
    }

    fn only_keepers(&self, caller: Address) -> RouterResult<()> {
        if caller == self.data.keeper
            || caller == self.settings.strategist
            || caller == self.settings.source_pool.governance()
        {
            Ok(())
        } else {
            Err(RouterError::Unauthorized)
        }
    }

    fn only_pool(&self, caller: Address) -> RouterResult<()> {
        if caller == self.settings.source_pool.address() {
            Ok(())
        } else {
            Err(RouterError::Unauthorized)
        }
    }

    // ---- balances ---------------------------------------------------

    pub fn balance_of_want(&self) -> U256 {
        self.settings.want.balance_of(self.address())
    }

    pub fn balance_of_synth(&self) -> U256 {
        match &self.settings.synth {
            Some(route) => route.exchange.synth_balance_of(self.address()),
            None => U256::ZERO,
        }
    }

    /// Want-equivalent value of the loose synth position.
    pub fn synth_value(&self) -> RouterResult<U256> {
        match &self.settings.synth {
            Some(route) => mul_div(
                route.exchange.synth_balance_of(self.address()),
                route.exchange.latest_price(),
                scale(),
            ),
            None => Ok(U256::ZERO),
        }
    }

    /// Value of the venue shares, denominated in the venue asset.
    pub fn value_of_investment(&self) -> RouterResult<U256> {
        shares_to_value(
            self.settings.venue.balance_of(self.address()),
            self.settings.venue.price_per_share(),
        )
    }

    /// Value of the venue shares, denominated in want.
    pub fn venue_value_in_want(&self) -> RouterResult<U256> {
        let value = self.value_of_investment()?;
        match &self.settings.synth {
            Some(route) => mul_div(value, route.exchange.latest_price(), scale()),
            None => Ok(value),
        }
    }

    /// Conservation view: want on hand + venue position + synth position.
    pub fn estimated_total_assets(&self) -> RouterResult<U256> {
        Ok(self
            .balance_of_want()
            .saturating_add(self.venue_value_in_want()?)
            .saturating_add(self.synth_value()?))
    }

    // ---- harvest ----------------------------------------------------

    /// Runs one full harvest cycle: mark profit/loss against the recorded
    /// debt, pass the projected result through the gates, raise want for
    /// the debt the pool wants repaid, report, and re-allocate whatever
    /// credit the pool extended. Debt payment settles before the buffer
    /// is resized.
    pub fn harvest(&mut self, caller: Address) -> RouterResult<HarvestReport> {
        self.only_keepers(caller)?;

        let strategy = self.address();
        let pool = self.settings.source_pool.clone();

        let prior_debt = pool.total_debt(strategy);
        let debt_outstanding = pool.debt_outstanding(strategy);
        let total_assets = self.estimated_total_assets()?;

        let (mut profit, mut loss) = if total_assets >= prior_debt {
            (total_assets - prior_debt, U256::ZERO)
        } else {
            (U256::ZERO, prior_debt - total_assets)
        };

        // The gates see the projected result before any capital moves,
        // so a rejection leaves every collaborator untouched. Slippage
        // realized by the liquidation below is bounded separately by
        // `max_loss_bps`.
        let projected_payment = total_assets.saturating_sub(profit).min(debt_outstanding);
        self.gate_loss(profit, loss)?;
        self.run_health_check(profit, loss, projected_payment, debt_outstanding, prior_debt)?;

        // Raise want to cover the repayment the pool expects, plus the
        // profit that flows back with the report.
        let amount_needed = debt_outstanding.saturating_add(profit);
        let free_want = self.balance_of_want();
        if self.data.mode == Mode::EmergencyExit {
            let (_, unwind_loss) = self.liquidate_all()?;
            loss = loss.saturating_add(unwind_loss);
        } else if amount_needed > free_want {
            let (_, liquidation_loss) = self.liquidate(amount_needed - free_want)?;
            loss = loss.saturating_add(liquidation_loss);
        }

        // Realized conversions net against the marked result.
        if profit >= loss {
            profit -= loss;
            loss = U256::ZERO;
        } else {
            loss -= profit;
            profit = U256::ZERO;
        }

        let free_want = self.balance_of_want();
        profit = profit.min(free_want);
        let debt_payment = (free_want - profit).min(debt_outstanding);

        let new_debt_outstanding = pool.report(strategy, profit, loss, debt_payment)?;
        self.data.total_debt_known = pool.total_debt(strategy);

        self.adjust_position()?;

        self.lock.mark_harvest(self.now());
        self.apply_change();

        let report = HarvestReport {
            profit,
            loss,
            debt_payment,
            debt_outstanding: new_debt_outstanding,
        };
        record_event(StrategyEvent::Harvested {
            strategy,
            profit,
            loss,
            debt_payment,
            debt_outstanding: new_debt_outstanding,
        });
        JournalEntry::new(Ok(()), LogType::HarvestResult)
            .strategy(self.settings.key)
            .note(format!(
                "Harvest reported profit {} loss {} debt payment {}.",
                profit, loss, debt_payment
            ))
            .commit();

        Ok(report)
    }

    /// Consults the external loss predictor before finalizing a nonzero
    /// loss. Losses above the configured tolerance abort the cycle.
    fn gate_loss(&self, profit: U256, loss: U256) -> RouterResult<()> {
        if loss.is_zero() {
            return Ok(());
        }
        let predicted = match &self.data.loss_checker {
            Some(checker) => checker.check(profit, loss, self.address()),
            None => NoLossChecker.check(profit, loss, self.address()),
        };
        JournalEntry::new(Ok(()), LogType::Info)
            .strategy(self.settings.key)
            .note(format!(
                "Loss checker predicted {} for a marked loss of {}.",
                predicted, loss
            ))
            .commit();

        if loss > self.data.fee_loss_tolerance {
            return Err(RouterError::LossyWithFees {
                loss,
                tolerance: self.data.fee_loss_tolerance,
            });
        }
        Ok(())
    }

    /// Runs the pluggable health check, honoring the one-time bypass.
    fn run_health_check(
        &mut self,
        profit: U256,
        loss: U256,
        debt_payment: U256,
        debt_outstanding: U256,
        total_debt: U256,
    ) -> RouterResult<()> {
        if !self.data.do_health_check {
            // Deliberate single-cycle bypass; re-arm for the next harvest
            // whether or not a checker is installed yet.
            self.data.do_health_check = true;
            JournalEntry::new(Ok(()), LogType::Info)
                .strategy(self.settings.key)
                .note("Health check bypassed for this cycle.")
                .commit();
            return Ok(());
        }
        let Some(check) = self.data.health_check.clone() else {
            return Ok(());
        };
        if check.check(profit, loss, debt_payment, debt_outstanding, total_debt) {
            Ok(())
        } else {
            Err(RouterError::HealthCheckFailed)
        }
    }

    // ---- pool-facing operations -------------------------------------

    /// Liquidates up to `amount_needed` and hands the proceeds to the
    /// source pool. Fails inside the exchange settlement window.
    pub fn withdraw(&mut self, caller: Address, amount_needed: U256) -> RouterResult<WithdrawalOutcome> {
        self.only_pool(caller)?;
        self.lock.require_settled(self.now())?;

        let free_want = self.balance_of_want();
        let mut loss = U256::ZERO;
        if free_want < amount_needed {
            let (_, liquidation_loss) = self.liquidate(amount_needed - free_want)?;
            loss = liquidation_loss;
        }

        let liquidated = self.balance_of_want().min(amount_needed);
        self.settings.want.transfer(
            self.address(),
            self.settings.source_pool.address(),
            liquidated,
        )?;
        self.apply_change();

        Ok(WithdrawalOutcome { liquidated, loss })
    }

    /// Transfers the entirety of the held value in kind to the successor
    /// instance. In-kind transfers realize zero slippage, so migration
    /// itself can neither create nor destroy value; the predecessor holds
    /// nothing afterwards.
    pub fn migrate(&mut self, caller: Address, successor: Address) -> RouterResult<()> {
        self.only_pool(caller)?;
        let strategy = self.address();

        let want_balance = self.balance_of_want();
        if !want_balance.is_zero() {
            self.settings
                .want
                .transfer(strategy, successor, want_balance)?;
        }

        let shares = self.settings.venue.balance_of(strategy);
        if !shares.is_zero() {
            self.settings
                .venue
                .transfer_shares(strategy, successor, shares)?;
        }

        if let Some(route) = &self.settings.synth {
            let synth_balance = route.exchange.synth_balance_of(strategy);
            if !synth_balance.is_zero() {
                route
                    .exchange
                    .transfer_synth(strategy, successor, synth_balance)?;
            }
        }

        // The source pool owns the cumulative ledger; the successor starts
        // fresh there.
        self.data.total_debt_known = U256::ZERO;
        self.apply_change();

        JournalEntry::new(Ok(()), LogType::Migration)
            .strategy(self.settings.key)
            .note(format!("Migrated all held value to {successor}."))
            .commit();
        Ok(())
    }

    // ---- governance operations --------------------------------------

    /// Forces the held venue asset into the destination venue, respecting
    /// the venue entry window.
    pub fn deposit_in_vault(&mut self, caller: Address) -> RouterResult<()> {
        self.only_governance(caller)?;
        self.lock.require_venue_entry_open(self.now())?;
        let strategy = self.address();

        let deposited = match &self.settings.synth {
            Some(route) => {
                let synth_balance = route.exchange.synth_balance_of(strategy);
                if !synth_balance.is_zero() {
                    self.settings.venue.deposit(strategy, synth_balance)?;
                }
                synth_balance
            }
            None => {
                let want_balance = self.balance_of_want();
                if !want_balance.is_zero() {
                    self.settings.venue.deposit(strategy, want_balance)?;
                }
                want_balance
            }
        };
        self.apply_change();

        JournalEntry::new(Ok(()), LogType::Allocation)
            .strategy(self.settings.key)
            .note(format!("Deposited {} into the destination venue.", deposited))
            .commit();
        Ok(())
    }

    /// Governance-forced unwind outside the harvest cycle.
    pub fn manual_remove_liquidity(
        &mut self,
        caller: Address,
        amount: U256,
    ) -> RouterResult<WithdrawalOutcome> {
        self.only_governance(caller)?;
        let (liquidated, loss) = self.liquidate(amount)?;
        self.apply_change();
        Ok(WithdrawalOutcome { liquidated, loss })
    }

    /// Governance-forced full unwind outside the harvest cycle.
    pub fn manual_remove_full_liquidity(&mut self, caller: Address) -> RouterResult<WithdrawalOutcome> {
        self.only_governance(caller)?;
        let (liquidated, loss) = self.liquidate_all()?;
        self.apply_change();
        Ok(WithdrawalOutcome { liquidated, loss })
    }

    /// One-way transition into full-unwind mode. Also tells the source
    /// pool to stop allocating to this instance.
    pub fn set_emergency_exit(&mut self, caller: Address) -> RouterResult<()> {
        self.only_governance(caller)?;
        self.data.mode = Mode::EmergencyExit;
        self.settings.source_pool.revoke_strategy(self.address());
        self.apply_change();

        JournalEntry::new(Ok(()), LogType::Info)
            .strategy(self.settings.key)
            .note("Emergency exit enabled; the strategy will only unwind.")
            .commit();
        Ok(())
    }

    // ---- governance setters -----------------------------------------

    pub fn set_keeper(&mut self, caller: Address, keeper: Address) -> RouterResult<()> {
        self.only_governance(caller)?;
        self.data.keeper(keeper);
        self.apply_change();
        Ok(())
    }

    pub fn set_health_check(
        &mut self,
        caller: Address,
        health_check: Option<Handle<dyn HealthCheck>>,
    ) -> RouterResult<()> {
        self.only_governance(caller)?;
        self.data.health_check(health_check);
        self.apply_change();
        Ok(())
    }

    pub fn set_do_health_check(&mut self, caller: Address, enabled: bool) -> RouterResult<()> {
        self.only_governance(caller)?;
        self.data.do_health_check = enabled;
        self.apply_change();
        Ok(())
    }

    pub fn set_loss_checker(
        &mut self,
        caller: Address,
        loss_checker: Option<Handle<dyn LossChecker>>,
    ) -> RouterResult<()> {
        self.only_governance(caller)?;
        self.data.loss_checker(loss_checker);
        self.apply_change();
        Ok(())
    }

    pub fn set_max_loss(&mut self, caller: Address, max_loss_bps: u64) -> RouterResult<()> {
        self.only_governance(caller)?;
        if max_loss_bps > MAX_BPS {
            return Err(RouterError::Custom(
                "Max loss cannot exceed 10_000 bps.".to_string(),
            ));
        }
        self.data.max_loss_bps(max_loss_bps);
        self.apply_change();
        Ok(())
    }

    pub fn set_fee_loss_tolerance(&mut self, caller: Address, tolerance: U256) -> RouterResult<()> {
        self.only_governance(caller)?;
        self.data.fee_loss_tolerance(tolerance);
        self.apply_change();
        Ok(())
    }

    /// Resizes the liquid reserve target. Subsequent harvests converge the
    /// reserve gradually; nothing is liquidated here.
    pub fn update_buffer(&mut self, caller: Address, buffer_bps: u64) -> RouterResult<()> {
        self.only_governance(caller)?;
        if buffer_bps > MAX_BPS {
            return Err(RouterError::Custom(
                "Buffer cannot exceed 10_000 bps.".to_string(),
            ));
        }
        self.data.buffer_bps(buffer_bps);
        self.apply_change();
        Ok(())
    }

    // ---- internal helpers shared with the allocation engine ----------

    /// Errors when a realized liquidation loss exceeds the configured
    /// per-move bound.
    pub(super) fn check_slippage(&self, requested: U256, loss: U256) -> RouterResult<()> {
        if loss > apply_bps(requested, self.data.max_loss_bps)? {
            return Err(RouterError::ExcessSlippage {
                loss,
                max_loss_bps: self.data.max_loss_bps,
            });
        }
        Ok(())
    }
}
