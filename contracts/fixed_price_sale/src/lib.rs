#![no_std]
#![allow(clippy::too_many_arguments)]

#[cfg(test)]
mod test_positions;
#[cfg(test)]
mod test_settlement;

pub mod authorizer;
mod clock;
mod contract;
mod errors;
pub mod events;
mod fees;
pub mod merkle;
mod positions;
pub mod registry;
mod storage;
mod types;
pub mod vesting;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use clock::{
    MAX_PREFUND_ALLOCATION_PERIOD, MAX_PREFUND_PERIOD, MAX_REFUND_PERIOD, MAX_SALE_PERIOD,
    MIN_PREFUND_ALLOCATION_PERIOD, MIN_PREFUND_PERIOD, MIN_REFUND_PERIOD, MIN_SALE_PERIOD,
};
pub use contract::{FixedPriceSale, FixedPriceSaleClient};
pub use errors::Error;
pub use fees::BPS_DENOMINATOR;
pub use types::{
    FixedPriceSaleConfiguration, FixedPriceSaleInitParams, InvestorPosition,
    InvestorVestingConfig, LegionAddresses, PositionTokenMetadata, SaleConfiguration,
    SaleInitParams, SalePhase, SaleState, SaleStatus, VestingConfiguration, VestingStatus,
    VestingType,
};
