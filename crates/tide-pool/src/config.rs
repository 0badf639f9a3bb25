//! Pool configuration: init-time parameters plus pool-wide counters.
//!
//! [`PoolConfig`] is created once when the pool is constructed, populated
//! once by init, and afterwards mutated only through stake/unstake
//! (`total_principal`, `interest_paid`) and sweep (`swept`).

use serde::{Deserialize, Serialize};
use tide_core::constants::PERIOD_SECONDS;
use tide_core::types::{Address, PoolParams, Timestamp};
use tide_interest::CompoundEngine;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    pub(crate) owner: Address,
    pub(crate) start: Timestamp,
    pub(crate) end: Timestamp,
    pub(crate) rate_per_period: u128,
    pub(crate) period_length: u64,
    pub(crate) hard_cap: u128,
    pub(crate) contribution_limit: u128,
    pub(crate) reward_budget: u128,
    pub(crate) initialized: bool,
    pub(crate) swept: bool,
    /// Sum of every patron's current principal.
    pub(crate) total_principal: u128,
    /// Withdrawn amounts that exceeded the withdrawing patron's principal.
    pub(crate) interest_paid: u128,
    /// Amount released to the owner by the sweep.
    pub(crate) swept_amount: u128,
}

impl PoolConfig {
    /// Configuration of a freshly constructed, uninitialized pool.
    pub fn uninitialized(owner: Address) -> Self {
        Self {
            owner,
            start: 0,
            end: 0,
            rate_per_period: 0,
            period_length: PERIOD_SECONDS,
            hard_cap: 0,
            contribution_limit: 0,
            reward_budget: 0,
            initialized: false,
            swept: false,
            total_principal: 0,
            interest_paid: 0,
            swept_amount: 0,
        }
    }

    /// Populate the init-time fields and mark the pool initialized.
    pub(crate) fn apply(&mut self, params: &PoolParams, reward_budget: u128) {
        self.owner = params.owner;
        self.start = params.start;
        self.end = params.end;
        self.rate_per_period = params.rate_per_period;
        self.hard_cap = params.hard_cap;
        self.contribution_limit = params.contribution_limit;
        self.reward_budget = reward_budget;
        self.initialized = true;
    }

    /// Interest engine for this pool's rate.
    pub fn engine(&self) -> CompoundEngine {
        CompoundEngine::new(self.rate_per_period)
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn rate_per_period(&self) -> u128 {
        self.rate_per_period
    }

    pub fn period_length(&self) -> u64 {
        self.period_length
    }

    pub fn hard_cap(&self) -> u128 {
        self.hard_cap
    }

    pub fn contribution_limit(&self) -> u128 {
        self.contribution_limit
    }

    pub fn reward_budget(&self) -> u128 {
        self.reward_budget
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_swept(&self) -> bool {
        self.swept
    }

    pub fn total_principal(&self) -> u128 {
        self.total_principal
    }

    pub fn interest_paid(&self) -> u128 {
        self.interest_paid
    }

    pub fn swept_amount(&self) -> u128 {
        self.swept_amount
    }

    /// Whether `now` falls inside the inclusive staking window.
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.initialized && now >= self.start && now <= self.end
    }

    /// Whether accrual has stopped for good.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.initialized && now > self.end
    }

    /// Principal the pool can still accept before reaching the hard cap.
    pub fn remaining_capacity(&self) -> u128 {
        self.hard_cap.saturating_sub(self.total_principal)
    }
}
