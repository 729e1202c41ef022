//! Sale timeline: period validation and the time predicates every entry point relies on.
//!
//! ```text
//!  init        prefund_end      start          end          refund_end
//!   |--prefund--|--allocation--|----sale------|---refund----|--settlement-->
//! ```

use soroban_sdk::{log, Env};

use crate::errors::Error;
use crate::types::{FixedPriceSaleConfiguration, SaleConfiguration, SalePhase};

const HOUR: u64 = 3_600;
const WEEK: u64 = 7 * 24 * HOUR;

pub const MIN_SALE_PERIOD: u64 = HOUR;
pub const MAX_SALE_PERIOD: u64 = 12 * WEEK;
pub const MIN_REFUND_PERIOD: u64 = HOUR;
pub const MAX_REFUND_PERIOD: u64 = 2 * WEEK;
pub const MIN_PREFUND_PERIOD: u64 = HOUR;
pub const MAX_PREFUND_PERIOD: u64 = 12 * WEEK;
pub const MIN_PREFUND_ALLOCATION_PERIOD: u64 = HOUR;
pub const MAX_PREFUND_ALLOCATION_PERIOD: u64 = 2 * WEEK;

/// Absolute boundaries of one sale, derived once at initialization.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timeline {
    pub prefund_end_time: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub refund_end_time: u64,
}

impl Timeline {
    /// Lays the periods out back to back starting at `now`.
    pub fn starting_at(
        now: u64,
        prefund_period: u64,
        prefund_allocation_period: u64,
        sale_period: u64,
        refund_period: u64,
    ) -> Result<Self, Error> {
        let prefund_end_time = now
            .checked_add(prefund_period)
            .ok_or(Error::ArithmeticOverflow)?;
        let start_time = prefund_end_time
            .checked_add(prefund_allocation_period)
            .ok_or(Error::ArithmeticOverflow)?;
        let end_time = start_time
            .checked_add(sale_period)
            .ok_or(Error::ArithmeticOverflow)?;
        let refund_end_time = end_time
            .checked_add(refund_period)
            .ok_or(Error::ArithmeticOverflow)?;
        Ok(Self {
            prefund_end_time,
            start_time,
            end_time,
            refund_end_time,
        })
    }

    pub fn from_config(config: &SaleConfiguration, fixed: &FixedPriceSaleConfiguration) -> Self {
        Self {
            prefund_end_time: fixed.prefund_end_time,
            start_time: config.start_time,
            end_time: config.end_time,
            refund_end_time: config.refund_end_time,
        }
    }

    pub fn is_prefund(&self, now: u64) -> bool {
        now < self.prefund_end_time
    }

    /// The narrow pre-start window in which investment is blocked.
    pub fn is_prefund_allocation_active(&self, now: u64) -> bool {
        now >= self.prefund_end_time && now < self.start_time
    }

    pub fn is_active(&self, now: u64) -> bool {
        now >= self.start_time && now < self.end_time
    }

    pub fn has_ended(&self, now: u64) -> bool {
        now >= self.end_time
    }

    pub fn is_refund_period(&self, now: u64) -> bool {
        now >= self.end_time && now < self.refund_end_time
    }

    pub fn is_refund_over(&self, now: u64) -> bool {
        now >= self.refund_end_time
    }

    pub fn phase(&self, now: u64) -> SalePhase {
        if self.is_prefund(now) {
            SalePhase::Prefund
        } else if self.is_prefund_allocation_active(now) {
            SalePhase::PrefundAllocation
        } else if self.is_active(now) {
            SalePhase::Active
        } else if self.is_refund_period(now) {
            SalePhase::Refund
        } else {
            SalePhase::RefundOver
        }
    }
}

fn within(value: u64, min: u64, max: u64) -> bool {
    value >= min && value <= max
}

/// Every period must sit inside its configured `[min, max]` bound.
pub fn validate_periods(
    sale_period: u64,
    refund_period: u64,
    prefund_period: u64,
    prefund_allocation_period: u64,
) -> Result<(), Error> {
    if !within(sale_period, MIN_SALE_PERIOD, MAX_SALE_PERIOD)
        || !within(refund_period, MIN_REFUND_PERIOD, MAX_REFUND_PERIOD)
        || !within(prefund_period, MIN_PREFUND_PERIOD, MAX_PREFUND_PERIOD)
        || !within(
            prefund_allocation_period,
            MIN_PREFUND_ALLOCATION_PERIOD,
            MAX_PREFUND_ALLOCATION_PERIOD,
        )
    {
        return Err(Error::InvalidPeriodConfig);
    }
    Ok(())
}

pub fn now(env: &Env) -> u64 {
    env.ledger().timestamp()
}

/// Investment is open during prefund and the active sale, closed in between and after.
pub fn verify_investment_window(env: &Env, timeline: &Timeline) -> Result<(), Error> {
    let now = now(env);
    if timeline.has_ended(now) {
        return Err(Error::SaleHasEnded);
    }
    if timeline.is_prefund_allocation_active(now) {
        return Err(Error::PrefundAllocationPeriodNotEnded);
    }
    Ok(())
}

pub fn verify_refund_period_is_over(env: &Env, timeline: &Timeline) -> Result<(), Error> {
    let now = now(env);
    if !timeline.is_refund_over(now) {
        log!(env, "refund period is not over", now, timeline.refund_end_time);
        return Err(Error::RefundPeriodIsNotOver);
    }
    Ok(())
}

pub fn verify_refund_period_is_not_over(env: &Env, timeline: &Timeline) -> Result<(), Error> {
    let now = now(env);
    if timeline.is_refund_over(now) {
        log!(env, "refund period is over", now, timeline.refund_end_time);
        return Err(Error::RefundPeriodIsOver);
    }
    Ok(())
}
