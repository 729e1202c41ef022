//! Test doubles for the sale's external collaborators and a ready-made sale fixture.
//!
//! Available to unit tests and, through the `testutils` feature, to the workspace
//! integration tests.

use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use soroban_sdk::{
    contract, contractimpl, contracttype,
    testutils::{Address as _, Events, Ledger},
    token, vec, Address, BytesN, Env, IntoVal, String, Symbol, TryFromVal, Val, Vec,
};

use crate::authorizer;
use crate::contract::{FixedPriceSale, FixedPriceSaleClient};
use crate::events::SALE_TOPIC;
use crate::merkle;
use crate::registry;
use crate::types::{
    FixedPriceSaleInitParams, InvestorVestingConfig, SaleConfiguration, SaleInitParams,
    VestingType,
};

/// One whole unit of a 7-decimal Stellar asset.
pub const UNIT: i128 = 10_000_000;
pub const GENESIS_TIME: u64 = 1_700_000_000;

const HOUR: u64 = 3_600;
const WEEK: u64 = 7 * 24 * HOUR;

// ── Address registry ─────────────────────────────────────────────────

#[contracttype]
#[derive(Clone)]
enum RegistryKey {
    Address(Symbol),
    Signer(Symbol),
}

#[contract]
pub struct MockRegistry;

#[contractimpl]
impl MockRegistry {
    pub fn set_address(env: Env, id: Symbol, address: Address) {
        env.storage()
            .instance()
            .set(&RegistryKey::Address(id), &address);
    }

    pub fn set_signer(env: Env, id: Symbol, key: BytesN<65>) {
        env.storage().instance().set(&RegistryKey::Signer(id), &key);
    }

    pub fn remove_address(env: Env, id: Symbol) {
        env.storage().instance().remove(&RegistryKey::Address(id));
    }

    pub fn get_legion_address(env: Env, id: Symbol) -> Option<Address> {
        env.storage().instance().get(&RegistryKey::Address(id))
    }

    pub fn get_legion_signer(env: Env, id: Symbol) -> Option<BytesN<65>> {
        env.storage().instance().get(&RegistryKey::Signer(id))
    }
}

// ── Vesting sink ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MockSchedule {
    pub beneficiary: Address,
    pub controller: Address,
    pub start: u64,
    pub duration: u64,
    pub cliff_duration: u64,
    /// Zero for a plain linear schedule.
    pub epoch_duration: u64,
    pub number_of_epochs: u64,
}

#[contracttype]
#[derive(Clone)]
enum SinkKey {
    Schedule,
    Released,
}

fn schedule(env: &Env) -> MockSchedule {
    env.storage()
        .instance()
        .get(&SinkKey::Schedule)
        .expect("sink not initialized")
}

fn released_amount(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&SinkKey::Released)
        .unwrap_or(0)
}

fn vested_amount(schedule: &MockSchedule, total: i128, now: u64) -> i128 {
    if now < schedule.start + schedule.cliff_duration {
        return 0;
    }
    let end = schedule.start + schedule.duration;
    if now >= end {
        return total;
    }
    let elapsed = if schedule.epoch_duration > 0 {
        let epochs = (now - schedule.start) / schedule.epoch_duration;
        epochs.min(schedule.number_of_epochs) * schedule.epoch_duration
    } else {
        now - schedule.start
    };
    total * elapsed as i128 / schedule.duration as i128
}

/// Linear (optionally epoch-stepped) vesting wallet with a cliff.
#[contract]
pub struct MockVestingSink;

#[contractimpl]
impl MockVestingSink {
    pub fn init(env: Env, schedule: MockSchedule) {
        env.storage().instance().set(&SinkKey::Schedule, &schedule);
    }

    pub fn beneficiary(env: Env) -> Address {
        schedule(&env).beneficiary
    }

    pub fn release(env: Env, token: Address) -> i128 {
        let amount = Self::releasable(env.clone(), token.clone());
        if amount > 0 {
            env.storage()
                .instance()
                .set(&SinkKey::Released, &(released_amount(&env) + amount));
            token::Client::new(&env, &token).transfer(
                &env.current_contract_address(),
                &schedule(&env).beneficiary,
                &amount,
            );
        }
        amount
    }

    pub fn released(env: Env, _token: Address) -> i128 {
        released_amount(&env)
    }

    pub fn releasable(env: Env, token: Address) -> i128 {
        let balance = token::Client::new(&env, &token).balance(&env.current_contract_address());
        let released = released_amount(&env);
        vested_amount(&schedule(&env), balance + released, env.ledger().timestamp()) - released
    }

    pub fn start(env: Env) -> u64 {
        schedule(&env).start
    }

    pub fn duration(env: Env) -> u64 {
        schedule(&env).duration
    }

    pub fn end(env: Env) -> u64 {
        let schedule = schedule(&env);
        schedule.start + schedule.duration
    }

    pub fn cliff_end_timestamp(env: Env) -> u64 {
        let schedule = schedule(&env);
        schedule.start + schedule.cliff_duration
    }
}

// ── Vesting factory ──────────────────────────────────────────────────

#[contracttype]
#[derive(Clone)]
enum FactoryKey {
    Pool,
    Created,
}

/// Hands out pre-registered [`MockVestingSink`] instances in registration order.
#[contract]
pub struct MockVestingFactory;

fn take_sink(env: &Env, schedule: MockSchedule) -> Address {
    let mut pool: Vec<Address> = env
        .storage()
        .instance()
        .get(&FactoryKey::Pool)
        .unwrap_or(Vec::new(env));
    let sink = pool.pop_front().expect("vesting sink pool exhausted");
    env.storage().instance().set(&FactoryKey::Pool, &pool);

    let created: u32 = env
        .storage()
        .instance()
        .get(&FactoryKey::Created)
        .unwrap_or(0);
    env.storage()
        .instance()
        .set(&FactoryKey::Created, &(created + 1));

    MockVestingSinkClient::new(env, &sink).init(&schedule);
    sink
}

#[contractimpl]
impl MockVestingFactory {
    pub fn add_sink(env: Env, sink: Address) {
        let mut pool: Vec<Address> = env
            .storage()
            .instance()
            .get(&FactoryKey::Pool)
            .unwrap_or(Vec::new(&env));
        pool.push_back(sink);
        env.storage().instance().set(&FactoryKey::Pool, &pool);
    }

    pub fn created_count(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&FactoryKey::Created)
            .unwrap_or(0)
    }

    pub fn create_linear_vesting(
        env: Env,
        beneficiary: Address,
        controller: Address,
        _token: Address,
        start: u64,
        duration: u64,
        cliff_duration: u64,
    ) -> Address {
        take_sink(
            &env,
            MockSchedule {
                beneficiary,
                controller,
                start,
                duration,
                cliff_duration,
                epoch_duration: 0,
                number_of_epochs: 0,
            },
        )
    }

    pub fn create_epoch_vesting(
        env: Env,
        beneficiary: Address,
        controller: Address,
        _token: Address,
        start: u64,
        duration: u64,
        cliff_duration: u64,
        epoch_duration: u64,
        number_of_epochs: u64,
    ) -> Address {
        take_sink(
            &env,
            MockSchedule {
                beneficiary,
                controller,
                start,
                duration,
                cliff_duration,
                epoch_duration,
                number_of_epochs,
            },
        )
    }
}

// ── Signer ───────────────────────────────────────────────────────────

/// Off-chain countersigning key.
pub struct TestSigner {
    key: SigningKey,
}

impl TestSigner {
    pub fn from_seed(seed: u8) -> Self {
        let mut secret = [0x42u8; 32];
        secret[31] = seed;
        Self {
            key: SigningKey::from_slice(&secret).expect("valid secp256k1 scalar"),
        }
    }

    pub fn public_key(&self, env: &Env) -> BytesN<65> {
        let point = self.key.verifying_key().to_encoded_point(false);
        let mut raw = [0u8; 65];
        raw.copy_from_slice(point.as_bytes());
        BytesN::from_array(env, &raw)
    }

    /// Signs `keccak256(message)`, returning `r || s || v` with `v` in `{0, 1}`.
    pub fn sign(&self, env: &Env, message: &soroban_sdk::Bytes) -> BytesN<65> {
        let digest = env.crypto().keccak256(message).to_array();
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .expect("signing succeeds");
        let mut raw = [0u8; 65];
        raw[..64].copy_from_slice(&signature.to_bytes());
        raw[64] = recovery_id.to_byte();
        BytesN::from_array(env, &raw)
    }
}

// ── Merkle tree ──────────────────────────────────────────────────────

/// Sorted-pair keccak tree over `(investor, amount)` leaves.
pub struct MerkleTree {
    env: Env,
    leaves: Vec<BytesN<32>>,
}

fn next_layer(env: &Env, layer: &Vec<BytesN<32>>) -> Vec<BytesN<32>> {
    let mut next = Vec::new(env);
    let mut i = 0;
    while i < layer.len() {
        let left = layer.get_unchecked(i);
        if i + 1 < layer.len() {
            next.push_back(merkle::hash_pair(env, &left, &layer.get_unchecked(i + 1)));
        } else {
            next.push_back(left);
        }
        i += 2;
    }
    next
}

impl MerkleTree {
    pub fn new(env: &Env, entries: &[(Address, i128)]) -> Self {
        let mut leaves = Vec::new(env);
        for (investor, amount) in entries {
            leaves.push_back(merkle::leaf_hash(env, investor, *amount));
        }
        Self {
            env: env.clone(),
            leaves,
        }
    }

    pub fn root(&self) -> BytesN<32> {
        let mut layer = self.leaves.clone();
        while layer.len() > 1 {
            layer = next_layer(&self.env, &layer);
        }
        layer.get_unchecked(0)
    }

    pub fn proof(&self, index: u32) -> Vec<BytesN<32>> {
        let mut proof = Vec::new(&self.env);
        let mut layer = self.leaves.clone();
        let mut index = index;
        while layer.len() > 1 {
            let sibling = index ^ 1;
            if sibling < layer.len() {
                proof.push_back(layer.get_unchecked(sibling));
            }
            layer = next_layer(&self.env, &layer);
            index /= 2;
        }
        proof
    }
}

// ── Sale fixture ─────────────────────────────────────────────────────

pub struct FeeRates {
    pub legion_on_capital: u32,
    pub legion_on_tokens: u32,
    pub referrer_on_capital: u32,
    pub referrer_on_tokens: u32,
}

impl Default for FeeRates {
    fn default() -> Self {
        Self {
            legion_on_capital: 250,
            legion_on_tokens: 250,
            referrer_on_capital: 100,
            referrer_on_tokens: 100,
        }
    }
}

/// A deployed sale with live collaborators and all auths mocked.
pub struct SaleFixture {
    pub env: Env,
    pub sale_id: Address,
    pub sale: FixedPriceSaleClient<'static>,
    pub bid: token::Client<'static>,
    pub bid_admin: token::StellarAssetClient<'static>,
    pub ask: token::Client<'static>,
    pub ask_admin: token::StellarAssetClient<'static>,
    pub project: Address,
    pub legion: Address,
    pub fee_receiver: Address,
    pub referrer: Address,
    pub vesting_controller: Address,
    pub registry: MockRegistryClient<'static>,
    pub factory: MockVestingFactoryClient<'static>,
    pub signer: TestSigner,
    pub sale_params: SaleInitParams,
    pub fixed_price_params: FixedPriceSaleInitParams,
}

fn create_token(
    env: &Env,
    admin: &Address,
) -> (token::Client<'static>, token::StellarAssetClient<'static>) {
    let address = env
        .register_stellar_asset_contract_v2(admin.clone())
        .address();
    (
        token::Client::new(env, &address),
        token::StellarAssetClient::new(env, &address),
    )
}

impl SaleFixture {
    /// Deploys every contract without initializing the sale.
    pub fn deploy(fees: FeeRates) -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.ledger().set_timestamp(GENESIS_TIME);

        let project = Address::generate(&env);
        let legion = Address::generate(&env);
        let fee_receiver = Address::generate(&env);
        let referrer = Address::generate(&env);
        let vesting_controller = Address::generate(&env);
        let token_admin = Address::generate(&env);

        let (bid, bid_admin) = create_token(&env, &token_admin);
        let (ask, ask_admin) = create_token(&env, &token_admin);

        let registry = MockRegistryClient::new(&env, &env.register(MockRegistry, ()));
        let factory = MockVestingFactoryClient::new(&env, &env.register(MockVestingFactory, ()));
        let signer = TestSigner::from_seed(1);

        registry.set_address(&registry::BOUNCER, &legion);
        registry.set_signer(&registry::SIGNER, &signer.public_key(&env));
        registry.set_address(&registry::FEE_RECEIVER, &fee_receiver);
        registry.set_address(&registry::VESTING_FACTORY, &factory.address);
        registry.set_address(&registry::VESTING_CONTROLLER, &vesting_controller);

        let sale_id = env.register(FixedPriceSale, ());
        let sale = FixedPriceSaleClient::new(&env, &sale_id);

        let sale_params = SaleInitParams {
            sale_period: WEEK,
            refund_period: 2 * WEEK,
            legion_capital_fee_bps: fees.legion_on_capital,
            legion_token_fee_bps: fees.legion_on_tokens,
            referrer_capital_fee_bps: fees.referrer_on_capital,
            referrer_token_fee_bps: fees.referrer_on_tokens,
            minimum_invest_amount: UNIT,
            bid_token: bid.address.clone(),
            ask_token: ask.address.clone(),
            project_admin: project.clone(),
            address_registry: registry.address.clone(),
            referrer_fee_receiver: referrer.clone(),
            sale_name: String::from_str(&env, "Legion LFG Sale"),
            sale_symbol: String::from_str(&env, "LLFG"),
            sale_base_uri: String::from_str(&env, "https://metadata.legion.cc/"),
        };
        let fixed_price_params = FixedPriceSaleInitParams {
            prefund_period: WEEK,
            prefund_allocation_period: HOUR,
            token_price: UNIT,
        };

        Self {
            env,
            sale_id,
            sale,
            bid,
            bid_admin,
            ask,
            ask_admin,
            project,
            legion,
            fee_receiver,
            referrer,
            vesting_controller,
            registry,
            factory,
            signer,
            sale_params,
            fixed_price_params,
        }
    }

    /// Deploys and initializes a sale with the default fee rates.
    pub fn new() -> Self {
        Self::with_fees(FeeRates::default())
    }

    pub fn with_fees(fees: FeeRates) -> Self {
        let fixture = Self::deploy(fees);
        fixture
            .sale
            .initialize(&fixture.sale_params, &fixture.fixed_price_params);
        fixture
    }

    pub fn config(&self) -> SaleConfiguration {
        self.sale.sale_configuration()
    }

    pub fn warp_to(&self, timestamp: u64) {
        self.env.ledger().set_timestamp(timestamp);
    }

    pub fn warp_to_allocation_period(&self) {
        self.warp_to(self.sale.fixed_price_sale_configuration().prefund_end_time);
    }

    pub fn warp_to_sale_start(&self) {
        self.warp_to(self.config().start_time);
    }

    pub fn warp_to_refund_period(&self) {
        self.warp_to(self.config().end_time);
    }

    pub fn warp_past_refund_period(&self) {
        self.warp_to(self.config().refund_end_time);
    }

    /// A fresh address holding `balance` bid tokens.
    pub fn investor(&self, balance: i128) -> Address {
        let investor = Address::generate(&self.env);
        if balance > 0 {
            self.bid_admin.mint(&investor, &balance);
        }
        investor
    }

    pub fn sign_investment(&self, investor: &Address) -> BytesN<65> {
        let message = self.env.as_contract(&self.sale_id, || {
            authorizer::investment_message(&self.env, investor)
        });
        self.signer.sign(&self.env, &message)
    }

    pub fn sign_transfer(&self, from: &Address, to: &Address, position_id: u64) -> BytesN<65> {
        let nonce = self.sale.transfer_nonce(from);
        let message = self.env.as_contract(&self.sale_id, || {
            authorizer::transfer_message(&self.env, from, to, position_id, nonce)
        });
        self.signer.sign(&self.env, &message)
    }

    pub fn invest(&self, investor: &Address, amount: i128) -> u64 {
        self.sale
            .invest(investor, &amount, &self.sign_investment(investor))
    }

    /// Adds `count` fresh sinks to the factory pool.
    pub fn provision_vesting_sinks(&self, count: u32) -> Vec<Address> {
        let mut sinks = Vec::new(&self.env);
        for _ in 0..count {
            let sink = self.env.register(MockVestingSink, ());
            self.factory.add_sink(&sink);
            sinks.push_back(sink);
        }
        sinks
    }

    /// Mints the allocation plus exact fees to the project and supplies them.
    pub fn supply_allocated_tokens(&self) {
        let allocated = self.sale.sale_status().total_tokens_allocated;
        let (legion_fee, referrer_fee) = self.sale.expected_token_fees();
        self.ask_admin
            .mint(&self.project, &(allocated + legion_fee + referrer_fee));
        self.sale
            .supply_tokens(&self.project, &allocated, &legion_fee, &referrer_fee);
    }
}

/// Schedule vesting linearly over a week after a one-day cliff, with `tge_rate_bps`
/// unlocked at claim.
pub fn linear_vesting(start: u64, tge_rate_bps: u32) -> InvestorVestingConfig {
    InvestorVestingConfig {
        vesting_start_time: start,
        vesting_duration_seconds: WEEK,
        vesting_cliff_duration_seconds: 24 * HOUR,
        vesting_type: VestingType::Linear,
        epoch_duration_seconds: 0,
        number_of_epochs: 0,
        token_allocation_on_tge_rate: tge_rate_bps,
    }
}

/// Payload of the most recent `(SALE, name)` event, if any was published.
pub fn last_sale_event<T: TryFromVal<Env, Val>>(env: &Env, name: Symbol) -> Option<T> {
    let topics: Vec<Val> = vec![env, SALE_TOPIC.into_val(env), name.into_val(env)];
    let mut found = None;
    for (_, event_topics, data) in env.events().all().iter() {
        if event_topics == topics {
            found = Some(data);
        }
    }
    found.map(|data| T::try_from_val(env, &data).ok().expect("event payload type"))
}
