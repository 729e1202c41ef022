//! Bridge to the external vesting factory and the per-investor vesting sinks.

use soroban_sdk::{log, Address, Env};

use crate::errors::Error;
use crate::fees::BPS_DENOMINATOR;
use crate::registry;
use crate::types::{InvestorVestingConfig, LegionAddresses, VestingStatus, VestingType};

#[soroban_sdk::contractclient(name = "VestingFactoryClient")]
pub trait VestingFactory {
    fn create_linear_vesting(
        env: Env,
        beneficiary: Address,
        controller: Address,
        token: Address,
        start: u64,
        duration: u64,
        cliff_duration: u64,
    ) -> Address;

    fn create_epoch_vesting(
        env: Env,
        beneficiary: Address,
        controller: Address,
        token: Address,
        start: u64,
        duration: u64,
        cliff_duration: u64,
        epoch_duration: u64,
        number_of_epochs: u64,
    ) -> Address;
}

#[soroban_sdk::contractclient(name = "VestingSinkClient")]
pub trait VestingSink {
    fn release(env: Env, token: Address) -> i128;
    fn released(env: Env, token: Address) -> i128;
    fn releasable(env: Env, token: Address) -> i128;
    fn start(env: Env) -> u64;
    fn duration(env: Env) -> u64;
    fn end(env: Env) -> u64;
    fn cliff_end_timestamp(env: Env) -> u64;
}

/// Structural checks on a caller-supplied schedule.
///
/// A schedule that unlocks everything at TGE needs no sink, so its durations are not
/// inspected.
pub fn validate_investor_config(env: &Env, config: &InvestorVestingConfig) -> Result<(), Error> {
    if config.token_allocation_on_tge_rate > BPS_DENOMINATOR {
        log!(env, "tge rate above 100%", config.token_allocation_on_tge_rate);
        return Err(Error::InvalidVestingConfig);
    }
    if !needs_sink(config) {
        return Ok(());
    }
    if config.vesting_duration_seconds == 0
        || config.vesting_cliff_duration_seconds > config.vesting_duration_seconds
    {
        return Err(Error::InvalidVestingConfig);
    }
    config
        .vesting_start_time
        .checked_add(config.vesting_duration_seconds)
        .ok_or(Error::ArithmeticOverflow)?;

    if config.vesting_type == VestingType::LinearEpoch {
        if config.epoch_duration_seconds == 0 || config.number_of_epochs == 0 {
            return Err(Error::InvalidVestingConfig);
        }
        let span = config
            .epoch_duration_seconds
            .checked_mul(config.number_of_epochs)
            .ok_or(Error::ArithmeticOverflow)?;
        if span != config.vesting_duration_seconds {
            log!(env, "epochs do not cover duration", span, config.vesting_duration_seconds);
            return Err(Error::InvalidVestingConfig);
        }
    }
    Ok(())
}

pub fn needs_sink(config: &InvestorVestingConfig) -> bool {
    config.token_allocation_on_tge_rate < BPS_DENOMINATOR
}

/// Returns the investor's sink, deploying one through the factory on first use.
pub fn deploy_or_reuse(
    env: &Env,
    existing: Option<Address>,
    beneficiary: &Address,
    legion: &LegionAddresses,
    token: &Address,
    config: &InvestorVestingConfig,
) -> Result<Address, Error> {
    if let Some(sink) = existing {
        return Ok(sink);
    }

    let factory = VestingFactoryClient::new(env, &legion.vesting_factory);
    let sink = match config.vesting_type {
        VestingType::Linear => factory.create_linear_vesting(
            beneficiary,
            &legion.vesting_controller,
            token,
            &config.vesting_start_time,
            &config.vesting_duration_seconds,
            &config.vesting_cliff_duration_seconds,
        ),
        VestingType::LinearEpoch => factory.create_epoch_vesting(
            beneficiary,
            &legion.vesting_controller,
            token,
            &config.vesting_start_time,
            &config.vesting_duration_seconds,
            &config.vesting_cliff_duration_seconds,
            &config.epoch_duration_seconds,
            &config.number_of_epochs,
        ),
    };
    registry::require_non_zero(env, &sink)?;
    Ok(sink)
}

pub fn release(env: &Env, sink: &Address, token: &Address) -> i128 {
    VestingSinkClient::new(env, sink).release(token)
}

pub fn status(env: &Env, sink: &Address, token: &Address) -> VestingStatus {
    let client = VestingSinkClient::new(env, sink);
    VestingStatus {
        vesting_address: sink.clone(),
        start: client.start(),
        end: client.end(),
        cliff_end: client.cliff_end_timestamp(),
        duration: client.duration(),
        released: client.released(token),
        releasable: client.releasable(token),
    }
}
