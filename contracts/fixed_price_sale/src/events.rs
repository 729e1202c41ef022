use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, Symbol};

// ==================== Event Payload Structs ====================
// Every payload is published under the topic pair (SALE_TOPIC, <event symbol>).
// Indexers subscribe on the first topic and dispatch on the second.

pub const SALE_TOPIC: Symbol = symbol_short!("SALE");

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct CapitalInvested {
    pub amount: i128,
    pub investor: Address,
    pub is_prefund: bool,
    pub position_id: u64,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct CapitalRefunded {
    pub amount: i128,
    pub investor: Address,
    pub position_id: u64,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct CapitalRefundedAfterCancel {
    pub amount: i128,
    pub investor: Address,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct AcceptedCapitalSet {
    pub accepted_merkle_root: BytesN<32>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct SaleResultsPublished {
    pub claim_merkle_root: BytesN<32>,
    pub accepted_merkle_root: BytesN<32>,
    pub tokens_allocated: i128,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct TokensSuppliedForDistribution {
    pub amount: i128,
    pub legion_fee: i128,
    pub referrer_fee: i128,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct CapitalWithdrawn {
    pub amount: i128,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct ExcessCapitalWithdrawn {
    pub amount: i128,
    pub investor: Address,
    pub position_id: u64,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct TokenAllocationClaimed {
    pub amount: i128,
    pub investor: Address,
    pub position_id: u64,
    /// `None` when the whole allocation unlocked at TGE.
    pub vesting_address: Option<Address>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct EmergencyWithdraw {
    pub to: Address,
    pub token: Address,
    pub amount: i128,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct LegionAddressesSynced {
    pub bouncer: Address,
    pub signer: BytesN<65>,
    pub fee_receiver: Address,
    pub vesting_factory: Address,
    pub vesting_controller: Address,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct PositionTransferred {
    pub from: Address,
    pub to: Address,
    pub position_id: u64,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct PositionBurned {
    pub owner: Address,
    pub position_id: u64,
}

// ==================== Emit Functions ====================

pub fn emit_capital_invested(
    env: &Env,
    amount: i128,
    investor: Address,
    is_prefund: bool,
    position_id: u64,
) {
    env.events().publish(
        (SALE_TOPIC, symbol_short!("invested")),
        CapitalInvested {
            amount,
            investor,
            is_prefund,
            position_id,
        },
    );
}

pub fn emit_capital_refunded(env: &Env, amount: i128, investor: Address, position_id: u64) {
    env.events().publish(
        (SALE_TOPIC, symbol_short!("refunded")),
        CapitalRefunded {
            amount,
            investor,
            position_id,
        },
    );
}

pub fn emit_capital_refunded_after_cancel(env: &Env, amount: i128, investor: Address) {
    env.events().publish(
        (SALE_TOPIC, symbol_short!("cncl_rfnd")),
        CapitalRefundedAfterCancel { amount, investor },
    );
}

pub fn emit_sale_canceled(env: &Env) {
    env.events()
        .publish((SALE_TOPIC, symbol_short!("canceled")), ());
}

pub fn emit_accepted_capital_set(env: &Env, accepted_merkle_root: BytesN<32>) {
    env.events().publish(
        (SALE_TOPIC, symbol_short!("acc_cap")),
        AcceptedCapitalSet {
            accepted_merkle_root,
        },
    );
}

pub fn emit_sale_results_published(
    env: &Env,
    claim_merkle_root: BytesN<32>,
    accepted_merkle_root: BytesN<32>,
    tokens_allocated: i128,
) {
    env.events().publish(
        (SALE_TOPIC, symbol_short!("published")),
        SaleResultsPublished {
            claim_merkle_root,
            accepted_merkle_root,
            tokens_allocated,
        },
    );
}

pub fn emit_tokens_supplied(env: &Env, amount: i128, legion_fee: i128, referrer_fee: i128) {
    env.events().publish(
        (SALE_TOPIC, symbol_short!("supplied")),
        TokensSuppliedForDistribution {
            amount,
            legion_fee,
            referrer_fee,
        },
    );
}

pub fn emit_capital_withdrawn(env: &Env, amount: i128) {
    env.events().publish(
        (SALE_TOPIC, symbol_short!("cap_wdrw")),
        CapitalWithdrawn { amount },
    );
}

pub fn emit_excess_capital_withdrawn(
    env: &Env,
    amount: i128,
    investor: Address,
    position_id: u64,
) {
    env.events().publish(
        (SALE_TOPIC, symbol_short!("excess")),
        ExcessCapitalWithdrawn {
            amount,
            investor,
            position_id,
        },
    );
}

pub fn emit_token_allocation_claimed(
    env: &Env,
    amount: i128,
    investor: Address,
    position_id: u64,
    vesting_address: Option<Address>,
) {
    env.events().publish(
        (SALE_TOPIC, symbol_short!("claimed")),
        TokenAllocationClaimed {
            amount,
            investor,
            position_id,
            vesting_address,
        },
    );
}

pub fn emit_emergency_withdraw(env: &Env, to: Address, token: Address, amount: i128) {
    env.events().publish(
        (SALE_TOPIC, symbol_short!("emergency")),
        EmergencyWithdraw { to, token, amount },
    );
}

pub fn emit_legion_addresses_synced(env: &Env, synced: LegionAddressesSynced) {
    env.events()
        .publish((SALE_TOPIC, symbol_short!("synced")), synced);
}

pub fn emit_position_transferred(env: &Env, from: Address, to: Address, position_id: u64) {
    env.events().publish(
        (SALE_TOPIC, symbol_short!("transfer")),
        PositionTransferred {
            from,
            to,
            position_id,
        },
    );
}

pub fn emit_position_burned(env: &Env, owner: Address, position_id: u64) {
    env.events().publish(
        (SALE_TOPIC, symbol_short!("burn")),
        PositionBurned { owner, position_id },
    );
}

pub fn emit_paused(env: &Env, paused: bool) {
    let topic = if paused {
        symbol_short!("paused")
    } else {
        symbol_short!("unpaused")
    };
    env.events().publish((SALE_TOPIC, topic), ());
}
