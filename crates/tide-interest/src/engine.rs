//! Compound interest engine implementing the [`InterestCalculator`] trait.
//!
//! An amount compounds one period at a time, each step a truncating
//! multiply by `1 + rate`. Compounding `a` periods and then `b` more is
//! therefore exactly compounding `a + b`, and splitting an amount never
//! earns more than compounding it whole. Periods are whole
//! [`PERIOD_SECONDS`] intervals; time past the pool's end never counts.

use serde::{Deserialize, Serialize};
use tide_core::constants::{PERIOD_SECONDS, WAD};
use tide_core::error::ArithmeticError;
use tide_core::traits::InterestCalculator;
use tide_core::types::Timestamp;

use crate::fixed::{fixed_pow, mul_wad_down};

/// Whole periods elapsed between `from` and `min(to, end)`.
///
/// Zero when `from` is at or past the clamped end of the interval.
pub fn elapsed_periods(from: Timestamp, to: Timestamp, end: Timestamp, period_length: u64) -> u64 {
    if period_length == 0 {
        return 0;
    }
    to.min(end).saturating_sub(from) / period_length
}

/// The production interest calculator: fixed per-period rate, hourly periods.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompoundEngine {
    rate_per_period: u128,
}

impl CompoundEngine {
    /// Create an engine for a WAD-scaled per-period rate.
    pub fn new(rate_per_period: u128) -> Self {
        Self { rate_per_period }
    }

    /// `1 + rate` on the WAD scale.
    fn base(&self) -> Result<u128, ArithmeticError> {
        WAD.checked_add(self.rate_per_period)
            .ok_or(ArithmeticError::Overflow)
    }

    /// Compound `principal` from `from` to `to`, with accrual frozen at `end`.
    pub fn compound_between(
        &self,
        principal: u128,
        from: Timestamp,
        to: Timestamp,
        end: Timestamp,
    ) -> Result<u128, ArithmeticError> {
        let periods = elapsed_periods(from, to, end, PERIOD_SECONDS);
        self.compound(principal, periods)
    }

    /// Total interest owed if `hard_cap` were staked at `start` and held to `end`.
    ///
    /// Upper bound on what the pool can ever owe, used to size the reward
    /// budget at deployment.
    pub fn worst_case_interest(
        &self,
        hard_cap: u128,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<u128, ArithmeticError> {
        let value = self.compound_between(hard_cap, start, end, end)?;
        value
            .checked_sub(hard_cap)
            .ok_or(ArithmeticError::Underflow)
    }
}

impl InterestCalculator for CompoundEngine {
    fn rate_per_period(&self) -> u128 {
        self.rate_per_period
    }

    fn growth_factor(&self, periods: u64) -> Result<u128, ArithmeticError> {
        fixed_pow(self.base()?, periods)
    }

    fn compound(&self, principal: u128, periods: u64) -> Result<u128, ArithmeticError> {
        if periods == 0 || principal == 0 {
            return Ok(principal);
        }
        let base = self.base()?;
        let mut value = principal;
        for _ in 0..periods {
            let next = mul_wad_down(value, base)?;
            // Truncation has stalled growth; every later step is the same.
            if next == value {
                break;
            }
            value = next;
        }
        Ok(value)
    }
}
