//! Role resolution through the Legion address registry.
//!
//! The sale never queries the registry on the hot path. `initialize` and
//! `sync_legion_addresses` resolve every role once and cache the result in
//! [`LegionAddresses`].

use soroban_sdk::{log, symbol_short, Address, BytesN, Env, String, Symbol};

use crate::errors::Error;
use crate::types::LegionAddresses;

pub const BOUNCER: Symbol = symbol_short!("BOUNCER");
pub const SIGNER: Symbol = symbol_short!("SIGNER");
pub const FEE_RECEIVER: Symbol = symbol_short!("FEE_RECV");
pub const VESTING_FACTORY: Symbol = symbol_short!("VEST_FACT");
pub const VESTING_CONTROLLER: Symbol = symbol_short!("VEST_CTRL");

const ZERO_ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

// Interface of the registry contract owned by the Legion factory layer.
#[soroban_sdk::contractclient(name = "AddressRegistryClient")]
pub trait AddressRegistry {
    fn get_legion_address(env: Env, id: Symbol) -> Option<Address>;
    fn get_legion_signer(env: Env, id: Symbol) -> Option<BytesN<65>>;
}

pub fn is_zero_address(env: &Env, address: &Address) -> bool {
    *address == Address::from_string(&String::from_str(env, ZERO_ACCOUNT))
}

pub fn require_non_zero(env: &Env, address: &Address) -> Result<(), Error> {
    if is_zero_address(env, address) {
        return Err(Error::ZeroAddressProvided);
    }
    Ok(())
}

fn resolve_address(
    env: &Env,
    registry: &AddressRegistryClient,
    role: Symbol,
) -> Result<Address, Error> {
    match registry.get_legion_address(&role) {
        Some(address) if !is_zero_address(env, &address) => Ok(address),
        _ => {
            log!(env, "registry role unresolved", role);
            Err(Error::ZeroAddressProvided)
        }
    }
}

fn resolve_signer(env: &Env, registry: &AddressRegistryClient) -> Result<BytesN<65>, Error> {
    match registry.get_legion_signer(&SIGNER) {
        Some(key) if key.to_array() != [0u8; 65] => Ok(key),
        _ => {
            log!(env, "registry role unresolved", SIGNER);
            Err(Error::ZeroAddressProvided)
        }
    }
}

/// Resolves every Legion role from `registry`. Missing roles are rejected.
pub fn resolve(env: &Env, registry: &Address) -> Result<LegionAddresses, Error> {
    let client = AddressRegistryClient::new(env, registry);
    Ok(LegionAddresses {
        bouncer: resolve_address(env, &client, BOUNCER)?,
        signer: resolve_signer(env, &client)?,
        fee_receiver: resolve_address(env, &client, FEE_RECEIVER)?,
        vesting_factory: resolve_address(env, &client, VESTING_FACTORY)?,
        vesting_controller: resolve_address(env, &client, VESTING_CONTROLLER)?,
    })
}
