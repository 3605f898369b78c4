//! Allocation engine
//!
//! Moves capital between the liquid want reserve, the synthetic-asset leg,
//! and the destination venue. Liquidations drain the cheapest source
//! first: loose synth before venue shares.

use alloy_primitives::U256;

use crate::{
    constants::scale,
    journal::{JournalEntry, LogType},
    strategy::settings::SynthRoute,
    types::Mode,
    utils::{
        common::{apply_bps, mul_div, value_to_shares},
        error::RouterResult,
    },
};

use super::{executable::ExecutableStrategy, ratio::RatioGuard};

impl ExecutableStrategy {
    /// Want kept liquid instead of being routed onwards. Only the
    /// synthetic variant holds a reserve; the direct variant invests
    /// everything.
    pub fn buffer_target(&self) -> RouterResult<U256> {
        if self.settings.synth.is_none() {
            return Ok(U256::ZERO);
        }
        apply_bps(self.data.total_debt_known, self.data.buffer_bps)
    }

    /// Routes want above the buffer target onwards. Runs after the report
    /// so the freshly extended credit is included. Never liquidates.
    pub(super) fn adjust_position(&mut self) -> RouterResult<()> {
        if self.data.mode == Mode::EmergencyExit {
            return Ok(());
        }

        let free_want = self.balance_of_want();
        let buffer = self.buffer_target()?;
        if free_want <= buffer {
            return Ok(());
        }
        let excess = free_want - buffer;
        let strategy = self.address();

        match self.settings.synth.clone() {
            None => {
                self.settings.venue.deposit(strategy, excess)?;
                JournalEntry::new(Ok(()), LogType::Allocation)
                    .strategy(self.settings.key)
                    .note(format!("Deposited {} want into the destination venue.", excess))
                    .commit();
            }
            Some(route) => {
                if !RatioGuard::clears_mint(route.exchange.as_ref())? {
                    JournalEntry::new(Ok(()), LogType::Allocation)
                        .strategy(self.settings.key)
                        .note("Collateralization ratio too low; allocation skipped.")
                        .commit();
                    return Ok(());
                }
                let minted = route.exchange.exchange_in(strategy, excess)?;
                self.note_exchange();
                JournalEntry::new(Ok(()), LogType::Allocation)
                    .strategy(self.settings.key)
                    .note(format!("Exchanged {} want into {} synth.", excess, minted))
                    .commit();
            }
        }
        Ok(())
    }

    /// Raises up to `amount` of want by unwinding held positions. Returns
    /// the want raised and the loss realized along the way.
    pub(super) fn liquidate(&mut self, amount: U256) -> RouterResult<(U256, U256)> {
        if amount.is_zero() {
            return Ok((U256::ZERO, U256::ZERO));
        }
        match self.settings.synth.clone() {
            None => self.liquidate_direct(amount),
            Some(route) => self.liquidate_via_exchange(&route, amount),
        }
    }

    /// Unwinds every held position back into want.
    pub(super) fn liquidate_all(&mut self) -> RouterResult<(U256, U256)> {
        let total = self
            .venue_value_in_want()?
            .saturating_add(self.synth_value()?);
        self.liquidate(total)
    }

    fn liquidate_direct(&mut self, amount: U256) -> RouterResult<(U256, U256)> {
        let strategy = self.address();
        let invested = self.value_of_investment()?;
        let target = amount.min(invested);
        if target.is_zero() {
            return Ok((U256::ZERO, U256::ZERO));
        }

        let price_per_share = self.settings.venue.price_per_share();
        let shares = value_to_shares(target, price_per_share)?
            .min(self.settings.venue.balance_of(strategy));
        let received = self
            .settings
            .venue
            .withdraw(strategy, shares, self.data.max_loss_bps)?;

        let loss = target.saturating_sub(received);
        self.check_slippage(target, loss)?;
        Ok((received, loss))
    }

    fn liquidate_via_exchange(
        &mut self,
        route: &SynthRoute,
        amount: U256,
    ) -> RouterResult<(U256, U256)> {
        let strategy = self.address();
        let price = route.exchange.latest_price();
        self.lock.require_settled(self.now())?;

        // Burning needs free collateral at the exchange. Without it the
        // exchange leg is skipped; the caller gets whatever want is loose.
        if !RatioGuard::clears_burn(route.exchange.as_ref()) {
            JournalEntry::new(Ok(()), LogType::Allocation)
                .strategy(self.settings.key)
                .note("Collateralization ratio below issuance; burn skipped.")
                .commit();
            return Ok((U256::ZERO, U256::ZERO));
        }

        let mut raised = U256::ZERO;
        let mut loss = U256::ZERO;
        let mut remaining = amount;

        // Loose synth costs nothing extra to burn.
        let loose = route.exchange.synth_balance_of(strategy);
        if !loose.is_zero() {
            let loose_value = mul_div(loose, price, scale())?;
            let take_value = remaining.min(loose_value);
            if !take_value.is_zero() {
                let synth_to_burn = mul_div(take_value, scale(), price)?.min(loose);
                let got = route.exchange.exchange_out(strategy, synth_to_burn)?;
                self.note_exchange();
                raised = raised.saturating_add(got);
                loss = loss.saturating_add(take_value.saturating_sub(got));
                remaining = remaining.saturating_sub(take_value);
            }
        }

        // Venue shares pay out in synth and need a second conversion.
        if !remaining.is_zero() {
            let synth_invested = self.value_of_investment()?;
            let synth_wanted = mul_div(remaining, scale(), price)?.min(synth_invested);
            if !synth_wanted.is_zero() {
                let price_per_share = self.settings.venue.price_per_share();
                let shares = value_to_shares(synth_wanted, price_per_share)?
                    .min(self.settings.venue.balance_of(strategy));
                let synth_got =
                    self.settings
                        .venue
                        .withdraw(strategy, shares, self.data.max_loss_bps)?;
                let expected = mul_div(synth_wanted, price, scale())?;
                let got = route.exchange.exchange_out(strategy, synth_got)?;
                self.note_exchange();
                raised = raised.saturating_add(got);
                loss = loss.saturating_add(expected.saturating_sub(got));
            }
        }

        self.check_slippage(raised.saturating_add(loss), loss)?;
        Ok((raised, loss))
    }
}
