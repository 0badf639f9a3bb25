//! Cross-crate test suite for the Tide staking pool.
//!
//! Integration tests drive a [`tide_pool::StakingPool`] over an in-memory
//! treasury through whole lifecycles and check pool-wide accounting
//! invariants after every operation.

pub mod helpers;
