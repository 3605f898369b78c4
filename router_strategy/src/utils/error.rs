use alloy_primitives::U256;
use serde::Serialize;

/// Router Strategy Result
pub type RouterResult<T> = Result<T, RouterError>;

/// Router Strategy Errors
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum RouterError {
    /// Caller lacks the required role for the operation
    Unauthorized,
    /// Double-initialize, or a clone attempted on a non-original instance
    Initialization(String),
    /// Operation attempted inside an active cool-down window
    TimeLock {
        /// Seconds left until the window elapses
        remaining: u64,
    },
    /// Predicted fee-only loss exceeds the configured tolerance
    LossyWithFees { loss: U256, tolerance: U256 },
    /// Pluggable sanity check rejected the harvest result
    HealthCheckFailed,
    /// A liquidation would exceed the configured maximum loss
    ExcessSlippage { loss: U256, max_loss_bps: u64 },
    /// A requested value does not exist
    NonExistentValue,
    /// Arithmetic error
    Arithmetic(String),
    /// Unknown/Custom error
    Custom(String),
}

pub fn arithmetic_err<S: AsRef<str>>(s: S) -> RouterError {
    RouterError::Arithmetic(s.as_ref().to_string())
}
