//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by the sale.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key              | Type                          |
//! |------------------|-------------------------------|
//! | `InitState`      | `InitState`                   |
//! | `SaleConfig`     | `SaleConfiguration`           |
//! | `FixedPriceConfig` | `FixedPriceSaleConfiguration` |
//! | `TokenMetadata`  | `PositionTokenMetadata`       |
//! | `Status`         | `SaleStatus`                  |
//! | `LegionAddrs`    | `LegionAddresses`             |
//! | `Paused`         | `bool`                        |
//! | `PositionCount`  | `u64`                         |
//!
//! Instance TTL is bumped by 7 days whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                    | Type               |
//! |------------------------|--------------------|
//! | `Position(id)`         | `InvestorPosition` |
//! | `PositionOwner(id)`    | `Address`          |
//! | `PositionOf(address)`  | `u64`              |
//! | `TransferNonce(address)` | `u64`            |
//!
//! Persistent TTL is bumped by 30 days whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, Env};

use crate::errors::Error;
use crate::types::{
    FixedPriceSaleConfiguration, InvestorPosition, LegionAddresses, PositionTokenMetadata,
    SaleConfiguration, SaleStatus,
};

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InitState {
    /// Implementation instance; never holds sale state.
    Template,
    Initialized,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    InitState,
    SaleConfig,
    FixedPriceConfig,
    TokenMetadata,
    Status,
    LegionAddrs,
    Paused,
    PositionCount,
    Position(u64),
    PositionOwner(u64),
    PositionOf(Address),
    TransferNonce(Address),
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

// ── Initialization ───────────────────────────────────────────────────

pub fn get_init_state(env: &Env) -> Option<InitState> {
    env.storage().instance().get(&DataKey::InitState)
}

pub fn set_init_state(env: &Env, state: InitState) {
    env.storage().instance().set(&DataKey::InitState, &state);
    bump_instance(env);
}

// ── Configuration ────────────────────────────────────────────────────

pub fn get_sale_config(env: &Env) -> Result<SaleConfiguration, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::SaleConfig)
        .ok_or(Error::NotInitialized)
}

pub fn set_sale_config(env: &Env, config: &SaleConfiguration) {
    env.storage().instance().set(&DataKey::SaleConfig, config);
}

pub fn get_fixed_price_config(env: &Env) -> Result<FixedPriceSaleConfiguration, Error> {
    env.storage()
        .instance()
        .get(&DataKey::FixedPriceConfig)
        .ok_or(Error::NotInitialized)
}

pub fn set_fixed_price_config(env: &Env, config: &FixedPriceSaleConfiguration) {
    env.storage()
        .instance()
        .set(&DataKey::FixedPriceConfig, config);
}

pub fn get_token_metadata(env: &Env) -> Result<PositionTokenMetadata, Error> {
    env.storage()
        .instance()
        .get(&DataKey::TokenMetadata)
        .ok_or(Error::NotInitialized)
}

pub fn set_token_metadata(env: &Env, metadata: &PositionTokenMetadata) {
    env.storage()
        .instance()
        .set(&DataKey::TokenMetadata, metadata);
}

pub fn get_legion_addresses(env: &Env) -> Result<LegionAddresses, Error> {
    env.storage()
        .instance()
        .get(&DataKey::LegionAddrs)
        .ok_or(Error::NotInitialized)
}

pub fn set_legion_addresses(env: &Env, addresses: &LegionAddresses) {
    env.storage()
        .instance()
        .set(&DataKey::LegionAddrs, addresses);
}

// ── Status ───────────────────────────────────────────────────────────

pub fn get_status(env: &Env) -> Result<SaleStatus, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Status)
        .ok_or(Error::NotInitialized)
}

pub fn set_status(env: &Env, status: &SaleStatus) {
    env.storage().instance().set(&DataKey::Status, status);
}

pub fn is_paused(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Paused)
        .unwrap_or(false)
}

pub fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&DataKey::Paused, &paused);
}

// ── Positions ────────────────────────────────────────────────────────

pub fn get_position_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::PositionCount)
        .unwrap_or(0)
}

/// Reads, increments and stores the position counter. Ids start at 1.
pub fn next_position_id(env: &Env) -> u64 {
    let id = get_position_count(env) + 1;
    env.storage().instance().set(&DataKey::PositionCount, &id);
    id
}

pub fn get_position(env: &Env, position_id: u64) -> Option<InvestorPosition> {
    let key = DataKey::Position(position_id);
    let position: Option<InvestorPosition> = env.storage().persistent().get(&key);
    if position.is_some() {
        bump_persistent(env, &key);
    }
    position
}

pub fn set_position(env: &Env, position: &InvestorPosition) {
    let key = DataKey::Position(position.position_id);
    env.storage().persistent().set(&key, position);
    bump_persistent(env, &key);
}

pub fn remove_position(env: &Env, position_id: u64) {
    env.storage()
        .persistent()
        .remove(&DataKey::Position(position_id));
    env.storage()
        .persistent()
        .remove(&DataKey::PositionOwner(position_id));
}

pub fn get_position_owner(env: &Env, position_id: u64) -> Option<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::PositionOwner(position_id))
}

pub fn set_position_owner(env: &Env, position_id: u64, owner: &Address) {
    let key = DataKey::PositionOwner(position_id);
    env.storage().persistent().set(&key, owner);
    bump_persistent(env, &key);
}

pub fn get_position_id_of(env: &Env, owner: &Address) -> Option<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::PositionOf(owner.clone()))
}

pub fn set_position_id_of(env: &Env, owner: &Address, position_id: u64) {
    let key = DataKey::PositionOf(owner.clone());
    env.storage().persistent().set(&key, &position_id);
    bump_persistent(env, &key);
}

pub fn remove_position_id_of(env: &Env, owner: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::PositionOf(owner.clone()));
}

pub fn get_transfer_nonce(env: &Env, owner: &Address) -> u64 {
    env.storage()
        .persistent()
        .get(&DataKey::TransferNonce(owner.clone()))
        .unwrap_or(0)
}

pub fn increment_transfer_nonce(env: &Env, owner: &Address) {
    let key = DataKey::TransferNonce(owner.clone());
    let next = get_transfer_nonce(env, owner).saturating_add(1);
    env.storage().persistent().set(&key, &next);
    bump_persistent(env, &key);
}
