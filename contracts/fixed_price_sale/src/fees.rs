//! Basis-point fee math for token supply and capital withdrawal.

use crate::errors::Error;
use crate::types::SaleConfiguration;

pub const BPS_DENOMINATOR: u32 = 10_000;

/// `amount * bps / 10_000`, rounded down.
pub fn apply_bps(amount: i128, bps: u32) -> Result<i128, Error> {
    amount
        .checked_mul(bps as i128)
        .map(|scaled| scaled / BPS_DENOMINATOR as i128)
        .ok_or(Error::ArithmeticOverflow)
}

/// Legion and referrer shares on each side may not exceed the whole amount.
pub fn validate_fee_config(config: &SaleConfiguration) -> Result<(), Error> {
    let on_capital = config.legion_capital_fee_bps as u64
        + config.referrer_capital_fee_bps as u64;
    let on_tokens =
        config.legion_token_fee_bps as u64 + config.referrer_token_fee_bps as u64;
    if on_capital > BPS_DENOMINATOR as u64 || on_tokens > BPS_DENOMINATOR as u64 {
        return Err(Error::InvalidFeeConfig);
    }
    Ok(())
}

/// `(legion_fee, referrer_fee)` owed in ask tokens on `tokens_allocated`.
pub fn token_fees(config: &SaleConfiguration, tokens_allocated: i128) -> Result<(i128, i128), Error> {
    Ok((
        apply_bps(tokens_allocated, config.legion_token_fee_bps)?,
        apply_bps(tokens_allocated, config.referrer_token_fee_bps)?,
    ))
}

/// `(legion_fee, referrer_fee)` owed in bid tokens on `capital_raised`.
pub fn capital_fees(config: &SaleConfiguration, capital_raised: i128) -> Result<(i128, i128), Error> {
    Ok((
        apply_bps(capital_raised, config.legion_capital_fee_bps)?,
        apply_bps(capital_raised, config.referrer_capital_fee_bps)?,
    ))
}

/// Bid-token value of `tokens_allocated` at the fixed price.
pub fn capital_raised(
    tokens_allocated: i128,
    token_price: i128,
    ask_token_decimals: u32,
) -> Result<i128, Error> {
    let unit = 10i128
        .checked_pow(ask_token_decimals)
        .ok_or(Error::ArithmeticOverflow)?;
    tokens_allocated
        .checked_mul(token_price)
        .map(|value| value / unit)
        .ok_or(Error::ArithmeticOverflow)
}
