//! Trait interfaces for the Tide staking pool.
//!
//! These traits define the contracts between crates:
//! - [`InterestCalculator`]: compounding math (tide-interest implements)
//! - [`Treasury`]: custody and movement of the native currency
//!   (the surrounding runtime implements; tide-pool ships an in-memory one)

use crate::error::{ArithmeticError, TransferError};
use crate::types::Address;

/// Pure computation of compound growth at a fixed per-period rate.
///
/// All math is integer fixed-point on the [`WAD`](crate::constants::WAD)
/// scale; every multiplication truncates toward zero.
pub trait InterestCalculator {
    /// The per-period rate on the WAD scale.
    fn rate_per_period(&self) -> u128;

    /// `(1 + rate)^periods` on the WAD scale.
    fn growth_factor(&self, periods: u64) -> Result<u128, ArithmeticError>;

    /// `principal * (1 + rate)^periods`, truncated.
    ///
    /// Implementations must satisfy `compound(compound(x, a), b) == compound(x, a + b)`
    /// and `compound(x, n) + compound(y, n) <= compound(x + y, n)`.
    fn compound(&self, principal: u128, periods: u64) -> Result<u128, ArithmeticError>;

    /// Interest earned on `principal` over `periods`.
    ///
    /// Default implementation: `compound(...) - principal`.
    fn interest(&self, principal: u128, periods: u64) -> Result<u128, ArithmeticError> {
        let value = self.compound(principal, periods)?;
        value
            .checked_sub(principal)
            .ok_or(ArithmeticError::Underflow)
    }
}

/// Custody of the pool's native currency.
///
/// Incoming currency arrives with the operation that carries it (init's
/// reward budget, a stake). Outgoing transfers are invoked only after the
/// pool has committed its own state.
pub trait Treasury {
    /// Currency currently held by the pool.
    fn balance(&self) -> u128;

    /// Record currency received from `from`.
    fn accept(&mut self, from: &Address, amount: u128) -> Result<(), TransferError>;

    /// Send `amount` to `to`. A failure leaves the balance unchanged.
    fn disburse(&mut self, to: &Address, amount: u128) -> Result<(), TransferError>;
}
