//! # Types
//!
//! Shared data structures of the fixed-price sale.
//!
//! ## Config / status split
//!
//! The sale is stored as a handful of singletons:
//!
//! - [`SaleConfiguration`] and [`FixedPriceSaleConfiguration`] are written once by
//!   `initialize` and never mutated afterwards.
//! - [`SaleStatus`] holds every mutable aggregate (capital totals, lifecycle flags,
//!   settlement roots).
//! - [`LegionAddresses`] is a read-through cache of registry lookups, refreshed only by
//!   `sync_legion_addresses`.
//!
//! Per-investor accounting lives in [`InvestorPosition`] records keyed by position id.

use soroban_sdk::{contracttype, Address, BytesN, String};

/// Parameters shared by every sale type, supplied once at initialization.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleInitParams {
    /// Length of the public sale window, in seconds.
    pub sale_period: u64,
    /// Length of the post-sale refund window, in seconds.
    pub refund_period: u64,
    pub legion_capital_fee_bps: u32,
    pub legion_token_fee_bps: u32,
    pub referrer_capital_fee_bps: u32,
    pub referrer_token_fee_bps: u32,
    /// Smallest accepted single investment, in bid-token units.
    pub minimum_invest_amount: i128,
    pub bid_token: Address,
    pub ask_token: Address,
    pub project_admin: Address,
    pub address_registry: Address,
    pub referrer_fee_receiver: Address,
    pub sale_name: String,
    pub sale_symbol: String,
    pub sale_base_uri: String,
}

/// Fixed-price specific parameters, supplied once at initialization.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FixedPriceSaleInitParams {
    /// Window before the sale where speculative investment is accepted.
    pub prefund_period: u64,
    /// Window between prefund end and sale start where investment is blocked.
    pub prefund_allocation_period: u64,
    /// Bid-token units paid per whole ask token.
    pub token_price: i128,
}

/// Immutable sale configuration with derived time boundaries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleConfiguration {
    pub start_time: u64,
    pub end_time: u64,
    pub refund_end_time: u64,
    pub sale_period: u64,
    pub refund_period: u64,
    pub legion_capital_fee_bps: u32,
    pub legion_token_fee_bps: u32,
    pub referrer_capital_fee_bps: u32,
    pub referrer_token_fee_bps: u32,
    pub minimum_invest_amount: i128,
    pub bid_token: Address,
    pub ask_token: Address,
    pub project_admin: Address,
    pub address_registry: Address,
    pub referrer_fee_receiver: Address,
}

/// Immutable fixed-price configuration.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FixedPriceSaleConfiguration {
    pub prefund_period: u64,
    pub prefund_allocation_period: u64,
    /// `start_time - prefund_allocation_period`.
    pub prefund_end_time: u64,
    pub token_price: i128,
    /// Decimals of the ask token, read from the token contract at initialization.
    pub ask_token_decimals: u32,
}

/// Position-token naming metadata.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionTokenMetadata {
    pub name: String,
    pub symbol: String,
    pub base_uri: String,
}

/// Mutable sale aggregates and lifecycle latches.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleStatus {
    /// Running sum of capital held for non-refunded positions.
    pub total_capital_invested: i128,
    /// Capital accepted by the sale, fixed at publication from the allocation.
    pub total_capital_raised: i128,
    pub total_tokens_allocated: i128,
    pub total_capital_withdrawn: i128,
    pub tokens_supplied_amount: i128,
    pub legion_fee_supplied: i128,
    pub referrer_fee_supplied: i128,
    pub is_canceled: bool,
    pub results_published: bool,
    pub tokens_supplied: bool,
    pub capital_withdrawn: bool,
    pub accepted_capital_merkle_root: Option<BytesN<32>>,
    pub claim_tokens_merkle_root: Option<BytesN<32>>,
}

/// Coarse lifecycle state derived from [`SaleStatus`] latches.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum SaleState {
    Active = 0,
    Canceled = 1,
    ResultsPublished = 2,
    TokensSupplied = 3,
    CapitalWithdrawn = 4,
}

/// Where the ledger clock currently sits relative to the sale timeline.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum SalePhase {
    Prefund = 0,
    PrefundAllocation = 1,
    Active = 2,
    Refund = 3,
    RefundOver = 4,
}

/// Accounting record of one investor, addressed by its position id.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvestorPosition {
    pub position_id: u64,
    pub invested_capital: i128,
    pub has_refunded: bool,
    pub has_settled: bool,
    pub has_claimed_excess: bool,
    /// Vesting sink, assigned on the first token claim.
    pub vesting_address: Option<Address>,
}

/// Cached registry lookups.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LegionAddresses {
    pub bouncer: Address,
    /// Uncompressed secp256k1 public key of the off-chain signer.
    pub signer: BytesN<65>,
    pub fee_receiver: Address,
    pub vesting_factory: Address,
    pub vesting_controller: Address,
}

/// Vesting collaborators used when settling claims.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingConfiguration {
    pub vesting_factory: Address,
    pub vesting_controller: Address,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum VestingType {
    Linear = 0,
    LinearEpoch = 1,
}

/// Per-investor vesting schedule supplied with a token claim.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvestorVestingConfig {
    pub vesting_start_time: u64,
    pub vesting_duration_seconds: u64,
    pub vesting_cliff_duration_seconds: u64,
    pub vesting_type: VestingType,
    /// Only meaningful for [`VestingType::LinearEpoch`].
    pub epoch_duration_seconds: u64,
    /// Only meaningful for [`VestingType::LinearEpoch`].
    pub number_of_epochs: u64,
    /// Share of the allocation released immediately at claim, in basis points.
    pub token_allocation_on_tge_rate: u32,
}

/// Snapshot of an investor's vesting sink.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingStatus {
    pub vesting_address: Address,
    pub start: u64,
    pub end: u64,
    pub cliff_end: u64,
    pub duration: u64,
    pub released: i128,
    pub releasable: i128,
}
