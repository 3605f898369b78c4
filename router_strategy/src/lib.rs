pub mod api;
pub mod collaborators;
pub mod constants;
pub mod journal;
pub mod state;
pub mod strategy;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use utils::error::{RouterError, RouterResult};
