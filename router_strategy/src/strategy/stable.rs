//! Stored strategy representation
//!
//! `StableStrategy` is the form kept in the registry. Operations convert
//! it into an `ExecutableStrategy`, run against that copy, and write back
//! only on success, so a failed operation leaves the stored state exactly
//! as it was.

use crate::{
    state::STRATEGY_STATE,
    utils::error::{RouterError, RouterResult},
};

use super::{data::StrategyData, executable::ExecutableStrategy, lock::TimeLock, settings::StrategySettings};

/// Stored strategy record
#[derive(Clone)]
pub struct StableStrategy {
    /// Immutable settings and configurations
    pub settings: StrategySettings,
    /// Mutable state
    pub data: StrategyData,
    /// Cool-down windows for the instance
    pub lock: TimeLock,
}

impl StableStrategy {
    pub fn new(settings: StrategySettings, data: StrategyData) -> Self {
        Self {
            settings,
            data,
            lock: TimeLock::default(),
        }
    }

    /// Registers the instance in the state. Registration doubles as the
    /// one-time initializer: a key that is already present means the
    /// instance was initialized before, and the call fails.
    pub fn mint(&self) -> RouterResult<()> {
        STRATEGY_STATE.with(|strategies| {
            let mut binding = strategies.borrow_mut();
            if binding.contains_key(&self.settings.key) {
                return Err(RouterError::Initialization(format!(
                    "Strategy key {} is already initialized.",
                    self.settings.key
                )));
            }
            binding.insert(self.settings.key, self.clone());
            Ok(())
        })
    }
}

impl From<&StableStrategy> for ExecutableStrategy {
    fn from(value: &StableStrategy) -> Self {
        ExecutableStrategy::new(
            value.settings.clone(),
            value.data.clone(),
            value.lock,
        )
    }
}

impl From<&ExecutableStrategy> for StableStrategy {
    fn from(value: &ExecutableStrategy) -> Self {
        StableStrategy {
            settings: value.settings.clone(),
            data: value.data.clone(),
            lock: value.lock,
        }
    }
}
