//! Countersignature checks for investment and self-service position transfers.
//!
//! The off-chain signer approves an action by signing `keccak256(message)` with its
//! secp256k1 key. Every message is scoped to this contract instance and to the
//! network it runs on. Transfer messages also bind the owner's transfer nonce.

use soroban_sdk::{log, xdr::ToXdr, Address, Bytes, BytesN, Env};

use crate::errors::Error;
use crate::storage;

const INVEST_TAG: &[u8] = b"legion.sale.invest";
const TRANSFER_TAG: &[u8] = b"legion.sale.transfer";

/// Order of the secp256k1 group, big-endian.
const CURVE_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// `CURVE_ORDER / 2`, the largest accepted `s`.
const HALF_CURVE_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

fn scoped_message(env: &Env, tag: &[u8]) -> Bytes {
    let mut message = Bytes::from_slice(env, tag);
    message.append(&env.current_contract_address().to_xdr(env));
    message.append(&Bytes::from(env.ledger().network_id()));
    message
}

/// Message the signer signs to let `investor` invest in this sale.
pub fn investment_message(env: &Env, investor: &Address) -> Bytes {
    let mut message = scoped_message(env, INVEST_TAG);
    message.append(&investor.clone().to_xdr(env));
    message
}

/// Message the signer signs to let `from` move `position_id` to `to`.
pub fn transfer_message(
    env: &Env,
    from: &Address,
    to: &Address,
    position_id: u64,
    nonce: u64,
) -> Bytes {
    let mut message = scoped_message(env, TRANSFER_TAG);
    message.append(&from.clone().to_xdr(env));
    message.append(&to.clone().to_xdr(env));
    message.append(&Bytes::from_array(env, &position_id.to_be_bytes()));
    message.append(&Bytes::from_array(env, &nonce.to_be_bytes()));
    message
}

/// Recovers the signer of `message` and compares it with the trusted key.
///
/// `signature` is `r || s || v`; `v` may be given as `0/1` or `27/28`.
pub fn verify_signature(
    env: &Env,
    message: &Bytes,
    signature: &BytesN<65>,
    trusted_signer: &BytesN<65>,
) -> Result<(), Error> {
    let raw = signature.to_array();
    let mut recovery_id = raw[64] as u32;
    if recovery_id >= 27 {
        recovery_id -= 27;
    }
    if recovery_id > 1 {
        log!(env, "invalid signature recovery id", signature.clone());
        return Err(Error::InvalidSignature);
    }

    let mut compact = [0u8; 64];
    compact.copy_from_slice(&raw[..64]);
    if !is_canonical(&compact) {
        log!(env, "malformed signature", signature.clone());
        return Err(Error::InvalidSignature);
    }

    let digest = env.crypto().keccak256(message);
    let recovered = env.crypto().secp256k1_recover(
        &digest,
        &BytesN::from_array(env, &compact),
        recovery_id,
    );
    if recovered != *trusted_signer {
        log!(env, "invalid signature", signature.clone());
        return Err(Error::InvalidSignature);
    }
    Ok(())
}

/// The host traps on `r` or `s` outside `[1, n)` and rejects high-`s` signatures, so both
/// are screened here: `0 < r < n` and `0 < s <= n / 2`.
fn is_canonical(compact: &[u8; 64]) -> bool {
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&compact[..32]);
    s.copy_from_slice(&compact[32..]);
    let zero = [0u8; 32];
    r != zero && r < CURVE_ORDER && s != zero && s <= HALF_CURVE_ORDER
}

pub fn authorize_investment(
    env: &Env,
    investor: &Address,
    signature: &BytesN<65>,
    trusted_signer: &BytesN<65>,
) -> Result<(), Error> {
    verify_signature(
        env,
        &investment_message(env, investor),
        signature,
        trusted_signer,
    )
}

/// Verifies a transfer approval against the current nonce of `from` and consumes it.
pub fn authorize_transfer(
    env: &Env,
    from: &Address,
    to: &Address,
    position_id: u64,
    signature: &BytesN<65>,
    trusted_signer: &BytesN<65>,
) -> Result<(), Error> {
    let nonce = storage::get_transfer_nonce(env, from);
    verify_signature(
        env,
        &transfer_message(env, from, to, position_id, nonce),
        signature,
        trusted_signer,
    )?;
    storage::increment_transfer_nonce(env, from);
    Ok(())
}
