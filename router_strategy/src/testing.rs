//! Mock collaborators and fixtures shared across the test modules

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use alloy_primitives::{Address, U256};

use crate::{
    api::{self, InitializeParams, SynthParams},
    collaborators::{Clock, DestinationVenue, Handle, SourcePool, SynthExchange, TokenLedger},
    constants::{max_bps, scale, MAX_BPS},
    strategy::{data::StrategyData, settings::StrategySettings, stable::StableStrategy},
    utils::{
        common::strategy_address,
        error::{RouterError, RouterResult},
    },
};

pub fn governance() -> Address {
    Address::repeat_byte(0xA0)
}

pub fn strategist() -> Address {
    Address::repeat_byte(0x11)
}

pub fn rewards() -> Address {
    Address::repeat_byte(0x22)
}

pub fn keeper() -> Address {
    Address::repeat_byte(0x66)
}

pub fn outsider() -> Address {
    Address::repeat_byte(0xBB)
}

/// Whole-token amount on an 18-decimal asset.
pub fn units(amount: u64) -> U256 {
    U256::from(amount) * scale()
}

// ---- clock ----------------------------------------------------------

pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn at(start: u64) -> Rc<Self> {
        Rc::new(Self {
            now: Cell::new(start),
        })
    }

    pub fn advance(&self, seconds: u64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.get()
    }
}

// ---- want-token ledger ----------------------------------------------

#[derive(Default)]
pub struct MockLedger {
    balances: RefCell<HashMap<Address, U256>>,
}

impl MockLedger {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn mint(&self, to: Address, amount: U256) {
        let mut balances = self.balances.borrow_mut();
        let entry = balances.entry(to).or_insert(U256::ZERO);
        *entry = entry.saturating_add(amount);
    }

    pub fn burn(&self, from: Address, amount: U256) {
        let mut balances = self.balances.borrow_mut();
        let entry = balances.entry(from).or_insert(U256::ZERO);
        *entry = entry.saturating_sub(amount);
    }
}

impl TokenLedger for MockLedger {
    fn balance_of(&self, holder: Address) -> U256 {
        self.balances
            .borrow()
            .get(&holder)
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn transfer(&self, from: Address, to: Address, amount: U256) -> RouterResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let mut balances = self.balances.borrow_mut();
        let from_balance = balances.get(&from).copied().unwrap_or(U256::ZERO);
        if from_balance < amount {
            return Err(RouterError::Custom(format!(
                "Ledger balance of {from} too low."
            )));
        }
        balances.insert(from, from_balance - amount);
        let to_balance = balances.get(&to).copied().unwrap_or(U256::ZERO);
        balances.insert(to, to_balance + amount);
        Ok(())
    }
}

// ---- synth exchange --------------------------------------------------

pub struct MockExchange {
    token: Address,
    sink: Address,
    want: Option<Rc<MockLedger>>,
    price: Cell<U256>,
    fee_bps: Cell<u64>,
    target: Cell<U256>,
    current: Cell<U256>,
    issuance: Cell<U256>,
    synth_balances: RefCell<HashMap<Address, U256>>,
}

impl MockExchange {
    /// Exchange without a backing want ledger; only the ratio and price
    /// surfaces are usable.
    pub fn unfunded() -> Self {
        Self {
            token: Address::repeat_byte(0x5A),
            sink: Address::repeat_byte(0xEE),
            want: None,
            price: Cell::new(scale()),
            fee_bps: Cell::new(0),
            target: Cell::new(scale() * U256::from(8_u64)),
            current: Cell::new(scale() * U256::from(8_u64)),
            issuance: Cell::new(scale() * U256::from(5_u64)),
            synth_balances: RefCell::new(HashMap::new()),
        }
    }

    /// Exchange backed by the given want ledger, with ample want liquidity
    /// on the counterparty side.
    pub fn funded(want: Rc<MockLedger>) -> Rc<Self> {
        let mut exchange = Self::unfunded();
        want.mint(exchange.sink, units(1_000_000_000));
        exchange.want = Some(want);
        Rc::new(exchange)
    }

    pub fn set_ratios(&self, target: U256, current: U256, issuance: U256) {
        self.target.set(target);
        self.current.set(current);
        self.issuance.set(issuance);
    }

    pub fn mint_synth(&self, to: Address, amount: U256) {
        self.credit(to, amount);
    }

    fn credit(&self, to: Address, amount: U256) {
        let mut balances = self.synth_balances.borrow_mut();
        let entry = balances.entry(to).or_insert(U256::ZERO);
        *entry = entry.saturating_add(amount);
    }

    fn debit(&self, from: Address, amount: U256) -> RouterResult<()> {
        let mut balances = self.synth_balances.borrow_mut();
        let held = balances.get(&from).copied().unwrap_or(U256::ZERO);
        if held < amount {
            return Err(RouterError::Custom(format!(
                "Synth balance of {from} too low."
            )));
        }
        balances.insert(from, held - amount);
        Ok(())
    }

    fn after_fee(&self, amount: U256) -> U256 {
        amount * U256::from(MAX_BPS - self.fee_bps.get()) / max_bps()
    }
}

impl SynthExchange for MockExchange {
    fn resolve(&self, key: &str) -> Option<Address> {
        (!key.is_empty()).then_some(self.token)
    }

    fn latest_price(&self) -> U256 {
        self.price.get()
    }

    fn exchange_in(&self, holder: Address, want_amount: U256) -> RouterResult<U256> {
        let want = self.want.as_ref().expect("funded exchange");
        want.transfer(holder, self.sink, want_amount)?;
        let minted = self.after_fee(want_amount * scale() / self.price.get());
        self.credit(holder, minted);
        Ok(minted)
    }

    fn exchange_out(&self, holder: Address, synth_amount: U256) -> RouterResult<U256> {
        self.debit(holder, synth_amount)?;
        let released = self.after_fee(synth_amount * self.price.get() / scale());
        let want = self.want.as_ref().expect("funded exchange");
        want.transfer(self.sink, holder, released)?;
        Ok(released)
    }

    fn synth_balance_of(&self, holder: Address) -> U256 {
        self.synth_balances
            .borrow()
            .get(&holder)
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn transfer_synth(&self, from: Address, to: Address, amount: U256) -> RouterResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        self.debit(from, amount)?;
        self.credit(to, amount);
        Ok(())
    }

    fn target_ratio(&self) -> U256 {
        self.target.get()
    }

    fn current_ratio(&self) -> U256 {
        self.current.get()
    }

    fn issuance_ratio(&self) -> U256 {
        self.issuance.get()
    }
}

// ---- destination venue -----------------------------------------------

pub enum VenueAsset {
    Token(Rc<MockLedger>),
    Synth(Rc<MockExchange>),
}

/// Share-based yield venue. Profit is injected by minting the venue asset
/// straight to the venue address, which raises the price per share.
pub struct MockVenue {
    address: Address,
    asset: VenueAsset,
    shares: RefCell<HashMap<Address, U256>>,
    total_shares: Cell<U256>,
    withdrawal_fee_bps: Cell<u64>,
}

impl MockVenue {
    pub fn holding_tokens(ledger: Rc<MockLedger>) -> Rc<Self> {
        Self::with_asset(VenueAsset::Token(ledger))
    }

    pub fn holding_synths(exchange: Rc<MockExchange>) -> Rc<Self> {
        Self::with_asset(VenueAsset::Synth(exchange))
    }

    fn with_asset(asset: VenueAsset) -> Rc<Self> {
        Rc::new(Self {
            address: Address::repeat_byte(0xFE),
            asset,
            shares: RefCell::new(HashMap::new()),
            total_shares: Cell::new(U256::ZERO),
            withdrawal_fee_bps: Cell::new(0),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn set_withdrawal_fee_bps(&self, fee_bps: u64) {
        self.withdrawal_fee_bps.set(fee_bps);
    }

    fn asset_balance(&self, holder: Address) -> U256 {
        match &self.asset {
            VenueAsset::Token(ledger) => ledger.balance_of(holder),
            VenueAsset::Synth(exchange) => exchange.synth_balance_of(holder),
        }
    }

    fn move_asset(&self, from: Address, to: Address, amount: U256) -> RouterResult<()> {
        match &self.asset {
            VenueAsset::Token(ledger) => ledger.transfer(from, to, amount),
            VenueAsset::Synth(exchange) => exchange.transfer_synth(from, to, amount),
        }
    }
}

impl DestinationVenue for MockVenue {
    fn deposit(&self, from: Address, amount: U256) -> RouterResult<U256> {
        let price_per_share = self.price_per_share();
        self.move_asset(from, self.address, amount)?;
        let minted = amount * scale() / price_per_share;
        let mut shares = self.shares.borrow_mut();
        let entry = shares.entry(from).or_insert(U256::ZERO);
        *entry = entry.saturating_add(minted);
        self.total_shares.set(self.total_shares.get() + minted);
        Ok(minted)
    }

    fn withdraw(&self, holder: Address, shares: U256, max_loss_bps: u64) -> RouterResult<U256> {
        let held = self.balance_of(holder);
        let shares = shares.min(held);
        if shares.is_zero() {
            return Ok(U256::ZERO);
        }
        let value = shares * self.price_per_share() / scale();
        let fee = value * U256::from(self.withdrawal_fee_bps.get()) / max_bps();
        if fee > value * U256::from(max_loss_bps) / max_bps() {
            return Err(RouterError::ExcessSlippage {
                loss: fee,
                max_loss_bps,
            });
        }

        self.shares.borrow_mut().insert(holder, held - shares);
        self.total_shares.set(self.total_shares.get() - shares);
        let payout = value - fee;
        self.move_asset(self.address, holder, payout)?;
        Ok(payout)
    }

    fn balance_of(&self, holder: Address) -> U256 {
        self.shares
            .borrow()
            .get(&holder)
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn price_per_share(&self) -> U256 {
        let supply = self.total_shares.get();
        if supply.is_zero() {
            scale()
        } else {
            self.total_assets() * scale() / supply
        }
    }

    fn total_assets(&self) -> U256 {
        self.asset_balance(self.address)
    }

    fn transfer_shares(&self, from: Address, to: Address, shares: U256) -> RouterResult<()> {
        if shares.is_zero() {
            return Ok(());
        }
        let mut balances = self.shares.borrow_mut();
        let held = balances.get(&from).copied().unwrap_or(U256::ZERO);
        if held < shares {
            return Err(RouterError::Custom(format!(
                "Share balance of {from} too low."
            )));
        }
        balances.insert(from, held - shares);
        let to_balance = balances.get(&to).copied().unwrap_or(U256::ZERO);
        balances.insert(to, to_balance + shares);
        Ok(())
    }
}

// ---- source pool -----------------------------------------------------

/// Debt-ledger pool. Credit extension is all-or-nothing: a strategy with
/// a nonzero allocation target receives every free want token on report.
pub struct MockPool {
    address: Address,
    governance: Address,
    want: Rc<MockLedger>,
    total_debt: RefCell<HashMap<Address, U256>>,
    debt_ratio_bps: RefCell<HashMap<Address, u64>>,
    total_gain: RefCell<HashMap<Address, U256>>,
    total_loss: RefCell<HashMap<Address, U256>>,
}

impl MockPool {
    pub fn new(want: Rc<MockLedger>) -> Rc<Self> {
        Rc::new(Self {
            address: Address::repeat_byte(0xF0),
            governance: governance(),
            want,
            total_debt: RefCell::new(HashMap::new()),
            debt_ratio_bps: RefCell::new(HashMap::new()),
            total_gain: RefCell::new(HashMap::new()),
            total_loss: RefCell::new(HashMap::new()),
        })
    }

    /// Simulates a user deposit into the pool.
    pub fn fund(&self, amount: U256) {
        self.want.mint(self.address, amount);
    }

    pub fn debt_ratio(&self, strategy: Address) -> u64 {
        self.debt_ratio_bps
            .borrow()
            .get(&strategy)
            .copied()
            .unwrap_or(MAX_BPS)
    }

    pub fn total_gain(&self, strategy: Address) -> U256 {
        self.total_gain
            .borrow()
            .get(&strategy)
            .copied()
            .unwrap_or(U256::ZERO)
    }

    pub fn total_loss(&self, strategy: Address) -> U256 {
        self.total_loss
            .borrow()
            .get(&strategy)
            .copied()
            .unwrap_or(U256::ZERO)
    }
}

impl SourcePool for MockPool {
    fn address(&self) -> Address {
        self.address
    }

    fn governance(&self) -> Address {
        self.governance
    }

    fn total_debt(&self, strategy: Address) -> U256 {
        self.total_debt
            .borrow()
            .get(&strategy)
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn debt_outstanding(&self, strategy: Address) -> U256 {
        if self.debt_ratio(strategy) == 0 {
            self.total_debt(strategy)
        } else {
            U256::ZERO
        }
    }

    fn report(
        &self,
        strategy: Address,
        profit: U256,
        loss: U256,
        debt_payment: U256,
    ) -> RouterResult<U256> {
        if !loss.is_zero() {
            let mut debts = self.total_debt.borrow_mut();
            let debt = debts.entry(strategy).or_insert(U256::ZERO);
            *debt = debt.saturating_sub(loss);
            drop(debts);
            let mut losses = self.total_loss.borrow_mut();
            let recorded = losses.entry(strategy).or_insert(U256::ZERO);
            *recorded = recorded.saturating_add(loss);
        }
        if !profit.is_zero() {
            self.want.transfer(strategy, self.address, profit)?;
            let mut gains = self.total_gain.borrow_mut();
            let recorded = gains.entry(strategy).or_insert(U256::ZERO);
            *recorded = recorded.saturating_add(profit);
        }
        if !debt_payment.is_zero() {
            self.want.transfer(strategy, self.address, debt_payment)?;
            let mut debts = self.total_debt.borrow_mut();
            let debt = debts.entry(strategy).or_insert(U256::ZERO);
            *debt = debt.saturating_sub(debt_payment);
        }

        if self.debt_ratio(strategy) > 0 {
            let credit = self.want.balance_of(self.address);
            if !credit.is_zero() {
                self.want.transfer(self.address, strategy, credit)?;
                let mut debts = self.total_debt.borrow_mut();
                let debt = debts.entry(strategy).or_insert(U256::ZERO);
                *debt = debt.saturating_add(credit);
            }
        }
        Ok(self.debt_outstanding(strategy))
    }

    fn revoke_strategy(&self, strategy: Address) {
        self.debt_ratio_bps.borrow_mut().insert(strategy, 0);
    }

    fn update_strategy_debt_ratio(&self, strategy: Address, bps: u64) {
        self.debt_ratio_bps.borrow_mut().insert(strategy, bps);
    }
}

// ---- fixtures --------------------------------------------------------

const START_TIME: u64 = 1_700_000_000;

pub fn direct_collaborators() -> (
    Handle<dyn TokenLedger>,
    Handle<dyn SourcePool>,
    Handle<dyn DestinationVenue>,
    Handle<dyn Clock>,
) {
    let want = MockLedger::new();
    let pool = MockPool::new(Rc::clone(&want));
    let venue = MockVenue::holding_tokens(Rc::clone(&want));
    let clock = ManualClock::at(START_TIME);
    (
        want as Handle<dyn TokenLedger>,
        pool as Handle<dyn SourcePool>,
        venue as Handle<dyn DestinationVenue>,
        clock as Handle<dyn Clock>,
    )
}

/// Direct-variant instance built outside the public operation surface.
pub fn stable_fixture(key: u32) -> StableStrategy {
    let (want, pool, venue, clock) = direct_collaborators();
    let settings = StrategySettings::new(
        key,
        strategy_address(key),
        "Route want to venue".to_string(),
        want,
        pool,
        venue,
        clock,
    )
    .strategist(strategist())
    .rewards(rewards());

    let mut data = StrategyData::default();
    data.keeper(keeper());
    StableStrategy::new(settings, data)
}

/// Fully initialized direct-variant instance plus its collaborators.
pub struct DirectHarness {
    pub key: u32,
    pub address: Address,
    pub want: Rc<MockLedger>,
    pub pool: Rc<MockPool>,
    pub venue: Rc<MockVenue>,
    pub clock: Rc<ManualClock>,
}

pub fn direct_harness(key: u32) -> DirectHarness {
    let want = MockLedger::new();
    let pool = MockPool::new(Rc::clone(&want));
    let venue = MockVenue::holding_tokens(Rc::clone(&want));
    let clock = ManualClock::at(START_TIME);

    let address = api::initialize(
        key,
        InitializeParams {
            name: "Route want to venue".to_string(),
            want: Rc::clone(&want) as Handle<dyn TokenLedger>,
            source_pool: Rc::clone(&pool) as Handle<dyn SourcePool>,
            venue: Rc::clone(&venue) as Handle<dyn DestinationVenue>,
            strategist: strategist(),
            rewards: rewards(),
            keeper: keeper(),
            synth: None,
            clock: Rc::clone(&clock) as Handle<dyn Clock>,
        },
    )
    .expect("initialization should succeed");

    DirectHarness {
        key,
        address,
        want,
        pool,
        venue,
        clock,
    }
}

/// Fully initialized synthetic-variant instance plus its collaborators.
pub struct SynthHarness {
    pub key: u32,
    pub address: Address,
    pub want: Rc<MockLedger>,
    pub pool: Rc<MockPool>,
    pub venue: Rc<MockVenue>,
    pub exchange: Rc<MockExchange>,
    pub clock: Rc<ManualClock>,
}

pub fn synth_harness(key: u32) -> SynthHarness {
    let want = MockLedger::new();
    let pool = MockPool::new(Rc::clone(&want));
    let exchange = MockExchange::funded(Rc::clone(&want));
    let venue = MockVenue::holding_synths(Rc::clone(&exchange));
    let clock = ManualClock::at(START_TIME);

    let address = api::initialize(
        key,
        InitializeParams {
            name: "Route want through synth to venue".to_string(),
            want: Rc::clone(&want) as Handle<dyn TokenLedger>,
            source_pool: Rc::clone(&pool) as Handle<dyn SourcePool>,
            venue: Rc::clone(&venue) as Handle<dyn DestinationVenue>,
            strategist: strategist(),
            rewards: rewards(),
            keeper: keeper(),
            synth: Some(SynthParams {
                exchange: Rc::clone(&exchange) as Handle<dyn SynthExchange>,
                key: "sTOKEN".to_string(),
                buffer_bps: 100,
            }),
            clock: Rc::clone(&clock) as Handle<dyn Clock>,
        },
    )
    .expect("initialization should succeed");

    SynthHarness {
        key,
        address,
        want,
        pool,
        venue,
        exchange,
        clock,
    }
}
