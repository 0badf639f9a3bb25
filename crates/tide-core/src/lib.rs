//! # tide-core
//! Foundation types and traits for the Tide staking pool.

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
pub mod units;
