use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // --- Initialization (1–3) ---
    InvalidInitialization = 1,
    NotInitialized = 2,
    SaleIsPaused = 3,

    // --- Authorization (10–12) ---
    NotCalledByLegion = 10,
    NotCalledByProject = 11,
    InvalidSignature = 12,

    // --- Lifecycle (20–33) ---
    SaleIsCanceled = 20,
    SaleIsNotCanceled = 21,
    SaleHasEnded = 22,
    PrefundAllocationPeriodNotEnded = 23,
    RefundPeriodIsNotOver = 24,
    RefundPeriodIsOver = 25,
    SaleResultsAlreadyPublished = 26,
    SaleResultsNotPublished = 27,
    TokensAlreadyAllocated = 28,
    TokensNotAllocated = 29,
    TokensAlreadySupplied = 30,
    TokensNotSupplied = 31,
    CapitalAlreadyWithdrawn = 32,
    CapitalNotRaised = 33,

    // --- Investor position (40–46) ---
    InvestorPositionDoesNotExist = 40,
    InvestorHasRefunded = 41,
    InvestorHasClaimedExcess = 42,
    AlreadyClaimedExcess = 43,
    AlreadySettled = 44,
    UnableToTransferInvestorPosition = 45,
    UnableToMergeInvestorPosition = 46,

    // --- Input validation (50–63) ---
    ZeroAddressProvided = 50,
    ZeroValueProvided = 51,
    InvalidPeriodConfig = 52,
    InvalidInvestAmount = 53,
    InvalidWithdrawAmount = 54,
    InvalidFeeAmount = 55,
    InvalidTokenAmountSupplied = 56,
    CannotWithdrawExcessInvestedCapital = 57,
    NotInClaimWhitelist = 58,
    InvalidFeeConfig = 59,
    InvalidVestingConfig = 60,
    InvalidTokenUri = 61,
    ArithmeticOverflow = 62,
}
