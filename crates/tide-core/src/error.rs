//! Error types for the Tide staking pool.
//!
//! [`PoolError`] messages for failed preconditions are part of the pool's
//! compatibility surface and must stay byte-for-byte stable.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("arithmetic overflow")] Overflow,
    #[error("arithmetic underflow")] Underflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("empty amount")] Empty,
    #[error("invalid digit in amount: {0}")] InvalidDigit(char),
    #[error("too many decimals: {0} > 18")] TooManyDecimals(usize),
    #[error("amount overflow")] Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("missing 0x prefix")] MissingPrefix,
    #[error("invalid length: {0} bytes")] InvalidLength(usize),
    #[error("invalid hex: {0}")] InvalidHex(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient balance: have {have}, need {need}")] InsufficientBalance { have: u128, need: u128 },
    #[error("transfer rejected by {0}")] Rejected(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Staking Pool not initialized")] NotInitialized,
    #[error("Staking Pool already initialized")] AlreadyInitialized,
    #[error("Staking pool is full")] PoolFull,
    #[error("Stake greater than contribution limit")] OverContributionLimit,
    #[error("Staking pool not yet started")] NotStarted,
    #[error("Staking pool already expired")] Expired,
    #[error("No funds available")] NoFundsAvailable,
    #[error("Cannot sweep before expiry")] SweepBeforeExpiry,
    #[error("Already sweeped")] AlreadySwept,
    #[error("changeOwner: already owner")] AlreadyOwner,
    #[error("OnlyOwner: Not authorized")] NotAuthorized,
    #[error("Invalid staking window: start {start} >= end {end}")] InvalidWindow { start: u64, end: u64 },
    #[error("Rate per period must be positive")] InvalidRate,
    #[error("Reward budget mismatch: expected {expected}, received {received}")] RewardBudgetMismatch { expected: u128, received: u128 },
    #[error("Reward budget shortfall: budget {budget}, owed {owed}")] BudgetShortfall { budget: u128, owed: u128 },
    #[error(transparent)] Arithmetic(#[from] ArithmeticError),
    #[error(transparent)] Transfer(#[from] TransferError),
}
