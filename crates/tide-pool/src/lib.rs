//! # tide-pool: Staking pool state and operations.
//!
//! Composes the pool from its parts:
//! - [`ledger::PatronLedger`]: per-patron records and the patron registry
//! - [`config::PoolConfig`]: init-time parameters and pool-wide counters
//! - [`pool::StakingPool`]: init, stake, unstake, ownership
//! - [`sweep`]: post-expiry reward reconciliation
//! - [`treasury::MemoryTreasury`]: in-memory currency custody
//! - [`snapshot`]: JSON persistence of a whole pool

pub mod config;
pub mod ledger;
pub mod pool;
pub mod snapshot;
pub mod sweep;
pub mod treasury;

pub use config::PoolConfig;
pub use ledger::{PatronEntry, PatronLedger};
pub use pool::StakingPool;
pub use sweep::SweepReport;
pub use treasury::MemoryTreasury;
