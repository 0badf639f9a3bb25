//! # tide-interest: Compound interest engine.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! - **Fixed-point multiply**: `a * b / WAD` with a 256-bit intermediate,
//!   truncating toward zero, so values up to `u128::MAX` never overflow mid-step.
//! - **Compound growth**: `principal * (1 + rate)^periods`, one truncating
//!   multiply per period so split and whole compounding agree.
//! - **Growth factor**: `(1 + rate)^periods` by binary exponentiation.
//! - **Period counting**: whole hours elapsed, frozen at the pool's end.

pub mod engine;
pub mod fixed;

pub use engine::{CompoundEngine, elapsed_periods};
pub use fixed::{fixed_pow, mul_wad_down};
