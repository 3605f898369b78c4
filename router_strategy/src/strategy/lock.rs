//! Exchange Settlement Time-Lock
//!
//! Tracks when routed capital last moved through the synthetic-asset
//! exchange and gates the operations that would move it again before the
//! exchange-side settlement logic has finalized.
//!
//! ```plain
//! Window timeline after an exchange at t0:
//!
//!   t0                t0+360s                 t0+3600s
//!   │  withdrawals     │  venue deposits       │  everything
//!   │  blocked         │  still blocked        │  open
//!   ├──────────────────┼───────────────────────┼──────────►
//!        settlement          venue entry
//! ```
//!
//! Both windows restart whenever capital moves through the exchange again.

use serde::Serialize;

use crate::{
    constants::{EXCHANGE_SETTLEMENT_WINDOW, VENUE_ENTRY_WINDOW},
    utils::error::{RouterError, RouterResult},
};

/// Per-instance cool-down state. Timestamps are seconds, read from the
/// instance clock at call time.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct TimeLock {
    /// Last time capital moved through the exchange
    pub last_exchange_at: Option<u64>,
    /// Last completed harvest cycle
    pub last_harvest_at: Option<u64>,
}

impl TimeLock {
    /// Restarts both cool-down windows.
    pub fn mark_exchange(&mut self, now: u64) -> &mut Self {
        self.last_exchange_at = Some(now);
        self
    }

    /// Records a completed harvest cycle.
    pub fn mark_harvest(&mut self, now: u64) -> &mut Self {
        self.last_harvest_at = Some(now);
        self
    }

    /// Fails with `TimeLock` while the exchange settlement window is
    /// active. Withdrawals and further exchanges must wait it out.
    pub fn require_settled(&self, now: u64) -> RouterResult<()> {
        self.require_elapsed(now, EXCHANGE_SETTLEMENT_WINDOW)
    }

    /// Fails with `TimeLock` while the venue entry window is active.
    /// Freshly converted assets may not enter the destination venue yet.
    pub fn require_venue_entry_open(&self, now: u64) -> RouterResult<()> {
        self.require_elapsed(now, VENUE_ENTRY_WINDOW)
    }

    fn require_elapsed(&self, now: u64, window: u64) -> RouterResult<()> {
        match self.last_exchange_at {
            None => Ok(()),
            Some(at) => {
                let open_at = at.saturating_add(window);
                if now >= open_at {
                    Ok(())
                } else {
                    Err(RouterError::TimeLock {
                        remaining: open_at - now,
                    })
                }
            }
        }
    }
}
