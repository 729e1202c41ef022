//! Position ledger and its non-fungible token facade.
//!
//! Each investor holds at most one position. A position is an arena record keyed by a
//! monotonic id plus two index entries (`id -> owner`, `owner -> id`); ownership moves
//! are plain map updates followed by an event.

use soroban_sdk::{log, Address, Env, String};

use crate::errors::Error;
use crate::events;
use crate::storage;
use crate::types::InvestorPosition;

const MAX_TOKEN_URI_LEN: usize = 256;
const MAX_ID_DIGITS: usize = 20;

pub fn position_id_of(env: &Env, owner: &Address) -> Option<u64> {
    storage::get_position_id_of(env, owner)
}

/// Loads the position held by `owner`.
pub fn load(env: &Env, owner: &Address) -> Result<InvestorPosition, Error> {
    position_id_of(env, owner)
        .and_then(|id| storage::get_position(env, id))
        .ok_or(Error::InvestorPositionDoesNotExist)
}

pub fn save(env: &Env, position: &InvestorPosition) {
    storage::set_position(env, position);
}

/// Creates an empty position for `owner` under a fresh id.
pub fn mint(env: &Env, owner: &Address) -> InvestorPosition {
    let position = InvestorPosition {
        position_id: storage::next_position_id(env),
        invested_capital: 0,
        has_refunded: false,
        has_settled: false,
        has_claimed_excess: false,
        vesting_address: None,
    };
    storage::set_position(env, &position);
    storage::set_position_owner(env, position.position_id, owner);
    storage::set_position_id_of(env, owner, position.position_id);
    position
}

pub fn burn(env: &Env, owner: &Address, position_id: u64) {
    storage::remove_position(env, position_id);
    storage::remove_position_id_of(env, owner);
    events::emit_position_burned(env, owner.clone(), position_id);
}

/// Hands `position_id` from `from` to `to`, who must not hold a position yet.
pub fn move_to(env: &Env, from: &Address, to: &Address, position_id: u64) {
    storage::remove_position_id_of(env, from);
    storage::set_position_owner(env, position_id, to);
    storage::set_position_id_of(env, to, position_id);
    events::emit_position_transferred(env, from.clone(), to.clone(), position_id);
}

/// Moves the position of `from` to `to`, merging into the position `to` already holds.
///
/// A source position that was refunded or had excess withdrawn cannot move, and a
/// destination in either state cannot absorb another position.
pub fn transfer(env: &Env, from: &Address, to: &Address, position_id: u64) -> Result<(), Error> {
    let owner = owner_of(env, position_id)?;
    if owner != *from || from == to {
        log!(env, "position not transferable", position_id);
        return Err(Error::UnableToTransferInvestorPosition);
    }
    let source = storage::get_position(env, position_id)
        .ok_or(Error::InvestorPositionDoesNotExist)?;
    if source.has_refunded || source.has_claimed_excess || source.has_settled {
        log!(env, "position not transferable", position_id);
        return Err(Error::UnableToTransferInvestorPosition);
    }

    let Some(target_id) = position_id_of(env, to) else {
        move_to(env, from, to, position_id);
        return Ok(());
    };

    let mut target = storage::get_position(env, target_id)
        .ok_or(Error::InvestorPositionDoesNotExist)?;
    if target.has_refunded || target.has_claimed_excess || target.has_settled {
        log!(env, "position cannot absorb transfer", target_id);
        return Err(Error::UnableToMergeInvestorPosition);
    }
    target.invested_capital = target
        .invested_capital
        .checked_add(source.invested_capital)
        .ok_or(Error::ArithmeticOverflow)?;
    save(env, &target);
    burn(env, from, position_id);
    Ok(())
}

// ── Token facade ─────────────────────────────────────────────────────

pub fn owner_of(env: &Env, position_id: u64) -> Result<Address, Error> {
    storage::get_position_owner(env, position_id).ok_or(Error::InvestorPositionDoesNotExist)
}

pub fn balance_of(env: &Env, owner: &Address) -> u32 {
    match position_id_of(env, owner) {
        Some(_) => 1,
        None => 0,
    }
}

/// `base_uri` followed by the decimal position id.
pub fn token_uri(env: &Env, position_id: u64) -> Result<String, Error> {
    owner_of(env, position_id)?;
    let base_uri = storage::get_token_metadata(env)?.base_uri;

    let base_len = base_uri.len() as usize;
    if base_len + MAX_ID_DIGITS > MAX_TOKEN_URI_LEN {
        return Err(Error::InvalidTokenUri);
    }
    let mut buffer = [0u8; MAX_TOKEN_URI_LEN];
    base_uri.copy_into_slice(&mut buffer[..base_len]);

    let mut digits = [0u8; MAX_ID_DIGITS];
    let mut count = 0;
    let mut remaining = position_id;
    loop {
        digits[count] = b'0' + (remaining % 10) as u8;
        count += 1;
        remaining /= 10;
        if remaining == 0 {
            break;
        }
    }
    for i in 0..count {
        buffer[base_len + i] = digits[count - 1 - i];
    }
    Ok(String::from_bytes(env, &buffer[..base_len + count]))
}
