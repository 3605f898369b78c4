//! Entry helper for running operations against a stored strategy

use crate::{
    state::STRATEGY_STATE,
    utils::error::{RouterError, RouterResult},
};

use super::executable::ExecutableStrategy;

/// Materializes an executable copy of the strategy stored under `key` and
/// runs `f` against it. Write-back is the operation's responsibility via
/// `apply_change`, so a failed closure leaves the stored record untouched.
/// The one exception is the settlement lock, which is persisted the moment
/// an exchange happens.
pub fn with_strategy<T>(
    key: u32,
    f: impl FnOnce(&mut ExecutableStrategy) -> RouterResult<T>,
) -> RouterResult<T> {
    let stable = STRATEGY_STATE
        .with(|strategies| strategies.borrow().get(&key).cloned())
        .ok_or(RouterError::NonExistentValue)?;

    let mut executable: ExecutableStrategy = (&stable).into();
    f(&mut executable)
}
