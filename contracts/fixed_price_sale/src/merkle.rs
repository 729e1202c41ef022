//! Merkle inclusion proofs over keccak-256 with sorted pair hashing.
//!
//! A leaf commits to `(investor, amount)`:
//!
//! ```text
//! leaf = keccak256( xdr(investor) || amount as 16-byte big-endian )
//! node = keccak256( min(a, b) || max(a, b) )
//! ```
//!
//! Proofs are plain lists of sibling hashes.

use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env, Vec};

pub fn leaf_hash(env: &Env, investor: &Address, amount: i128) -> BytesN<32> {
    let mut payload = Bytes::new(env);
    payload.append(&investor.clone().to_xdr(env));
    payload.append(&Bytes::from_array(env, &amount.to_be_bytes()));
    env.crypto().keccak256(&payload).into()
}

pub fn hash_pair(env: &Env, a: &BytesN<32>, b: &BytesN<32>) -> BytesN<32> {
    let (left, right) = if a.to_array() <= b.to_array() {
        (a, b)
    } else {
        (b, a)
    };
    let mut payload = Bytes::new(env);
    payload.append(&Bytes::from(left.clone()));
    payload.append(&Bytes::from(right.clone()));
    env.crypto().keccak256(&payload).into()
}

/// Folds `proof` over `leaf` and compares the result with `root`.
pub fn verify(env: &Env, proof: &Vec<BytesN<32>>, root: &BytesN<32>, leaf: BytesN<32>) -> bool {
    let mut computed = leaf;
    for sibling in proof.iter() {
        computed = hash_pair(env, &computed, &sibling);
    }
    computed == *root
}
