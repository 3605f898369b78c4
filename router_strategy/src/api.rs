//! Public operation surface
//!
//! Free functions over the strategy registry. Each operation resolves the
//! stored instance, runs against an executable copy, and relies on the
//! strategy's own write-back for persistence.

use alloy_primitives::{Address, U256};

use crate::{
    collaborators::{
        Clock, DestinationVenue, Handle, HealthCheck, LossChecker, SourcePool, SynthExchange,
        TokenLedger,
    },
    journal::{JournalEntry, LogType},
    state::{self, EVENTS, JOURNAL, STRATEGY_STATE},
    strategy::{
        data::StrategyData,
        run::with_strategy,
        settings::{StrategySettings, SynthRoute},
        stable::StableStrategy,
    },
    types::{HarvestReport, Provenance, StrategyEvent, StrategyQuery, WithdrawalOutcome},
    utils::{
        common::strategy_address,
        error::{RouterError, RouterResult},
    },
};

/// Synthetic-asset leg configuration for a new instance.
pub struct SynthParams {
    pub exchange: Handle<dyn SynthExchange>,
    /// Resolver key of the synth token
    pub key: String,
    pub buffer_bps: u64,
}

/// Everything a new instance needs, set once.
pub struct InitializeParams {
    pub name: String,
    pub want: Handle<dyn TokenLedger>,
    pub source_pool: Handle<dyn SourcePool>,
    pub venue: Handle<dyn DestinationVenue>,
    pub strategist: Address,
    pub rewards: Address,
    pub keeper: Address,
    pub synth: Option<SynthParams>,
    pub clock: Handle<dyn Clock>,
}

/// Role addresses for a cloned instance.
pub struct CloneParams {
    pub strategist: Address,
    pub rewards: Address,
    pub keeper: Address,
    /// Replacement source pool; the clone reuses the original's when absent
    pub source_pool: Option<Handle<dyn SourcePool>>,
}

fn stored(key: u32) -> RouterResult<StableStrategy> {
    STRATEGY_STATE
        .with(|strategies| strategies.borrow().get(&key).cloned())
        .ok_or(RouterError::NonExistentValue)
}

/// Creates and registers a new strategy instance under `key`. Fails if the
/// key is taken or the synth key does not resolve.
pub fn initialize(key: u32, params: InitializeParams) -> RouterResult<Address> {
    let address = strategy_address(key);

    let synth_route = match &params.synth {
        Some(synth) => {
            let token = synth.exchange.resolve(&synth.key).ok_or_else(|| {
                RouterError::Initialization(format!("Synth key {} did not resolve.", synth.key))
            })?;
            Some(SynthRoute {
                key: synth.key.clone(),
                token,
                exchange: synth.exchange.clone(),
            })
        }
        None => None,
    };

    let settings = StrategySettings::new(
        key,
        address,
        params.name,
        params.want,
        params.source_pool,
        params.venue,
        params.clock,
    )
    .synth(synth_route)
    .strategist(params.strategist)
    .rewards(params.rewards);

    let mut data = StrategyData::default();
    data.keeper(params.keeper);
    if let Some(synth) = &params.synth {
        data.buffer_bps(synth.buffer_bps);
    }

    StableStrategy::new(settings, data).mint()?;

    JournalEntry::new(Ok(()), LogType::Info)
        .strategy(key)
        .note(format!("Initialized strategy at {address}."))
        .commit();
    Ok(address)
}

/// Clones a direct-variant original into a fresh instance with its own
/// state and roles. Clones may not be cloned again.
pub fn clone_router(source_key: u32, params: CloneParams) -> RouterResult<(u32, Address)> {
    let source = stored(source_key)?;
    if source.settings.provenance == Provenance::Clone {
        return Err(RouterError::Initialization(
            "Clones may not be cloned again.".to_string(),
        ));
    }
    if source.settings.synth.is_some() {
        return Err(RouterError::Initialization(
            "Synthetic instances clone through the synthetic clone operation.".to_string(),
        ));
    }

    let key = state::next_key();
    let address = strategy_address(key);
    let settings = StrategySettings::new(
        key,
        address,
        source.settings.name.clone(),
        source.settings.want.clone(),
        params
            .source_pool
            .unwrap_or_else(|| source.settings.source_pool.clone()),
        source.settings.venue.clone(),
        source.settings.clock.clone(),
    )
    .provenance(Provenance::Clone)
    .strategist(params.strategist)
    .rewards(params.rewards);

    let mut data = StrategyData::default();
    data.keeper(params.keeper);
    StableStrategy::new(settings, data).mint()?;

    state::record_event(StrategyEvent::Cloned { clone: address });
    JournalEntry::new(Ok(()), LogType::Info)
        .strategy(key)
        .note(format!("Cloned strategy {source_key} to {address}."))
        .commit();
    Ok((key, address))
}

/// Clones a synthetic-variant original, re-resolving the synth route for
/// the new instance.
pub fn clone_synthetix_router(
    source_key: u32,
    params: CloneParams,
    synth_key: String,
    name: String,
) -> RouterResult<(u32, Address)> {
    let source = stored(source_key)?;
    if source.settings.provenance == Provenance::Clone {
        return Err(RouterError::Initialization(
            "Clones may not be cloned again.".to_string(),
        ));
    }
    let route = source.settings.synth.clone().ok_or_else(|| {
        RouterError::Initialization("Source instance has no synthetic leg.".to_string())
    })?;
    let token = route.exchange.resolve(&synth_key).ok_or_else(|| {
        RouterError::Initialization(format!("Synth key {synth_key} did not resolve."))
    })?;

    let key = state::next_key();
    let address = strategy_address(key);
    let settings = StrategySettings::new(
        key,
        address,
        name,
        source.settings.want.clone(),
        params
            .source_pool
            .unwrap_or_else(|| source.settings.source_pool.clone()),
        source.settings.venue.clone(),
        source.settings.clock.clone(),
    )
    .provenance(Provenance::Clone)
    .synth(Some(SynthRoute {
        key: synth_key,
        token,
        exchange: route.exchange.clone(),
    }))
    .strategist(params.strategist)
    .rewards(params.rewards);

    let mut data = StrategyData::default();
    data.keeper(params.keeper).buffer_bps(source.data.buffer_bps);
    StableStrategy::new(settings, data).mint()?;

    state::record_event(StrategyEvent::FullCloned { clone: address });
    JournalEntry::new(Ok(()), LogType::Info)
        .strategy(key)
        .note(format!("Fully cloned strategy {source_key} to {address}."))
        .commit();
    Ok((key, address))
}

// ---- lifecycle operations --------------------------------------------

/// Runs one harvest cycle on the instance stored under `key`.
pub fn harvest(caller: Address, key: u32) -> RouterResult<HarvestReport> {
    let result = with_strategy(key, |strategy| strategy.harvest(caller));
    if let Err(error) = &result {
        JournalEntry::new(Err(error.clone()), LogType::HarvestResult)
            .strategy(key)
            .commit();
    }
    result
}

/// Source-pool withdrawal of up to `amount` want.
pub fn withdraw(caller: Address, key: u32, amount: U256) -> RouterResult<WithdrawalOutcome> {
    with_strategy(key, |strategy| strategy.withdraw(caller, amount))
}

/// Source-pool-driven migration of all held value to `successor`.
pub fn migrate(caller: Address, key: u32, successor: Address) -> RouterResult<()> {
    with_strategy(key, |strategy| strategy.migrate(caller, successor))
}

/// Pushes held venue assets into the destination venue.
pub fn deposit_in_vault(caller: Address, key: u32) -> RouterResult<()> {
    with_strategy(key, |strategy| strategy.deposit_in_vault(caller))
}

pub fn manual_remove_liquidity(
    caller: Address,
    key: u32,
    amount: U256,
) -> RouterResult<WithdrawalOutcome> {
    with_strategy(key, |strategy| strategy.manual_remove_liquidity(caller, amount))
}

pub fn manual_remove_full_liquidity(caller: Address, key: u32) -> RouterResult<WithdrawalOutcome> {
    with_strategy(key, |strategy| strategy.manual_remove_full_liquidity(caller))
}

pub fn set_emergency_exit(caller: Address, key: u32) -> RouterResult<()> {
    with_strategy(key, |strategy| strategy.set_emergency_exit(caller))
}

// ---- governance setters ----------------------------------------------

pub fn set_keeper(caller: Address, key: u32, keeper: Address) -> RouterResult<()> {
    with_strategy(key, |strategy| strategy.set_keeper(caller, keeper))
}

pub fn set_health_check(
    caller: Address,
    key: u32,
    health_check: Option<Handle<dyn HealthCheck>>,
) -> RouterResult<()> {
    with_strategy(key, |strategy| {
        strategy.set_health_check(caller, health_check)
    })
}

pub fn set_do_health_check(caller: Address, key: u32, enabled: bool) -> RouterResult<()> {
    with_strategy(key, |strategy| strategy.set_do_health_check(caller, enabled))
}

pub fn set_loss_checker(
    caller: Address,
    key: u32,
    loss_checker: Option<Handle<dyn LossChecker>>,
) -> RouterResult<()> {
    with_strategy(key, |strategy| {
        strategy.set_loss_checker(caller, loss_checker)
    })
}

pub fn set_max_loss(caller: Address, key: u32, max_loss_bps: u64) -> RouterResult<()> {
    with_strategy(key, |strategy| strategy.set_max_loss(caller, max_loss_bps))
}

pub fn set_fee_loss_tolerance(caller: Address, key: u32, tolerance: U256) -> RouterResult<()> {
    with_strategy(key, |strategy| {
        strategy.set_fee_loss_tolerance(caller, tolerance)
    })
}

pub fn update_buffer(caller: Address, key: u32, buffer_bps: u64) -> RouterResult<()> {
    with_strategy(key, |strategy| strategy.update_buffer(caller, buffer_bps))
}

// ---- queries ---------------------------------------------------------

/// Read-only view over the stored instance.
pub fn strategy_query(key: u32) -> RouterResult<StrategyQuery> {
    let stable = stored(key)?;
    Ok(StrategyQuery {
        key: stable.settings.key,
        address: stable.settings.address,
        name: stable.settings.name.clone(),
        provenance: stable.settings.provenance,
        mode: stable.data.mode,
        synth_key: stable.settings.synth.as_ref().map(|route| route.key.clone()),
        total_debt_known: stable.data.total_debt_known,
        buffer_bps: stable.data.buffer_bps,
        max_loss_bps: stable.data.max_loss_bps,
        fee_loss_tolerance: stable.data.fee_loss_tolerance,
        do_health_check: stable.data.do_health_check,
        last_exchange_at: stable.lock.last_exchange_at,
        last_harvest_at: stable.lock.last_harvest_at,
    })
}

pub fn estimated_total_assets(key: u32) -> RouterResult<U256> {
    with_strategy(key, |strategy| strategy.estimated_total_assets())
}

pub fn balance_of_want(key: u32) -> RouterResult<U256> {
    with_strategy(key, |strategy| Ok(strategy.balance_of_want()))
}

pub fn value_of_investment(key: u32) -> RouterResult<U256> {
    with_strategy(key, |strategy| strategy.value_of_investment())
}

/// Strategy records emitted so far.
pub fn events() -> Vec<StrategyEvent> {
    EVENTS.with(|events| events.borrow().clone())
}

/// Serialized journal for off-system inspection.
pub fn export_journal() -> RouterResult<String> {
    JOURNAL
        .with(|journal| serde_json::to_string(&*journal.borrow()))
        .map_err(|error| RouterError::Custom(error.to_string()))
}
