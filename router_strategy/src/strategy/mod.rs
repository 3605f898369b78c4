//! Strategy logic and state machine
//!
//! One logic module drives many independently-stored instances. The
//! stored form (`stable`) is converted into a working form (`executable`)
//! for the duration of an operation and written back on success.

pub mod allocation;
pub mod data;
pub mod executable;
pub mod lock;
pub mod ratio;
pub mod run;
pub mod settings;
pub mod stable;
