//! Immutable strategy settings
//!
//! Set exactly once when an instance is initialized, either directly or by
//! the clone factory. Everything mutable lives in `StrategyData`.

use alloy_primitives::Address;

use crate::{
    collaborators::{Clock, DestinationVenue, Handle, SourcePool, SynthExchange, TokenLedger},
    types::Provenance,
};

/// The optional synthetic-asset leg between the want token and the
/// destination venue.
#[derive(Clone)]
pub struct SynthRoute {
    /// Resolver key for the synth token
    pub key: String,
    /// Synth token address resolved at initialization
    pub token: Address,
    /// Exchange/issuance protocol handle
    pub exchange: Handle<dyn SynthExchange>,
}

/// Per-instance configuration, set once at initialization
#[derive(Clone)]
pub struct StrategySettings {
    /// Key in the `STRATEGY_STATE` registry
    pub key: u32,
    /// Identity of this instance in the token ledgers
    pub address: Address,
    /// Human-readable strategy name
    pub name: String,
    /// Original deployment or single-generation clone
    pub provenance: Provenance,
    /// The want-token ledger the source pool denominates debt in
    pub want: Handle<dyn TokenLedger>,
    /// Pool that allocates capital and tracks the debt ledger
    pub source_pool: Handle<dyn SourcePool>,
    /// Yield-bearing pool capital is routed into
    pub venue: Handle<dyn DestinationVenue>,
    /// Synthetic-asset leg, if the venue is not reachable in want
    pub synth: Option<SynthRoute>,
    /// Strategist role address
    pub strategist: Address,
    /// Rewards recipient address
    pub rewards: Address,
    /// Time source, read fresh inside every operation
    pub clock: Handle<dyn Clock>,
}

impl StrategySettings {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        key: u32,
        address: Address,
        name: String,
        want: Handle<dyn TokenLedger>,
        source_pool: Handle<dyn SourcePool>,
        venue: Handle<dyn DestinationVenue>,
        clock: Handle<dyn Clock>,
    ) -> Self {
        Self {
            key,
            address,
            name,
            provenance: Provenance::Original,
            want,
            source_pool,
            venue,
            synth: None,
            strategist: Address::ZERO,
            rewards: Address::ZERO,
            clock,
        }
    }

    /// Sets the provenance of the instance.
    pub fn provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Sets the synthetic-asset route for the instance.
    pub fn synth(mut self, synth: Option<SynthRoute>) -> Self {
        self.synth = synth;
        self
    }

    /// Sets the strategist role address.
    pub fn strategist(mut self, strategist: Address) -> Self {
        self.strategist = strategist;
        self
    }

    /// Sets the rewards recipient address.
    pub fn rewards(mut self, rewards: Address) -> Self {
        self.rewards = rewards;
        self
    }
}
