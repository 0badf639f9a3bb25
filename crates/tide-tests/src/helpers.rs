//! Shared fixtures and invariant checks for E2E and adversarial tests.

use tide_core::constants::{PERIOD_SECONDS, UNIT};
use tide_core::traits::Treasury;
use tide_core::types::{Address, PoolParams, RewardFunding, Timestamp};
use tide_interest::CompoundEngine;
use tide_pool::{MemoryTreasury, StakingPool};

/// Window opening time used by the standard fixture.
pub const START: Timestamp = 1_700_000_000;
/// Hourly periods in the standard 30-day window.
pub const PERIODS: u64 = 720;
pub const END: Timestamp = START + PERIODS * PERIOD_SECONDS;
/// 0.0000225 per period.
pub const RATE: u128 = 22_500_000_000_000;
pub const HARD_CAP: u128 = 100 * UNIT;
pub const CONTRIBUTION_LIMIT: u128 = 50 * UNIT;

pub type Pool = StakingPool<MemoryTreasury>;

/// Deterministic address from a seed byte.
pub fn addr(seed: u8) -> Address {
    Address([seed; 20])
}

pub fn owner() -> Address {
    addr(0xEE)
}

/// Parameters of the standard fixture.
pub fn params() -> PoolParams {
    PoolParams {
        owner: owner(),
        start: START,
        end: END,
        rate_per_period: RATE,
        hard_cap: HARD_CAP,
        contribution_limit: CONTRIBUTION_LIMIT,
    }
}

/// `compound(hardCap, start, end) - hardCap` for `params`.
pub fn worst_case(params: &PoolParams) -> u128 {
    CompoundEngine::new(params.rate_per_period)
        .worst_case_interest(params.hard_cap, params.start, params.end)
        .unwrap()
}

/// Deploy and initialize a pool, sending exactly the budget `funding` requires.
pub fn deploy(params: PoolParams, funding: RewardFunding) -> Pool {
    let received = match funding {
        RewardFunding::Declared(b) => b,
        RewardFunding::WorstCase => worst_case(&params),
    };
    let mut pool = Pool::new(owner(), MemoryTreasury::new());
    pool.init(&owner(), params, funding, received, START - 1)
        .unwrap();
    pool
}

/// Standard fixture funded with the worst-case budget.
pub fn standard_pool() -> Pool {
    deploy(params(), RewardFunding::WorstCase)
}

/// Assert every pool-wide accounting invariant as of `now`.
///
/// - each record: `principal <= accrued`, `principal <= contribution_limit`,
///   `checkpoint <= end`
/// - tracked total principal equals the ledger sum and respects the hard cap
/// - before the sweep the treasury holds `budget + total_principal - interest_paid`
///   and covers every patron's accrued value
/// - after the sweep the treasury holds exactly what patrons can still redeem
pub fn assert_invariants(pool: &Pool, now: Timestamp) {
    let cfg = pool.config();
    for (patron, record) in pool.ledger().iter() {
        assert!(
            record.principal <= record.accrued,
            "{patron}: principal {} > accrued {}",
            record.principal,
            record.accrued
        );
        assert!(record.principal <= cfg.contribution_limit(), "{patron}: over limit");
        assert!(record.checkpoint <= cfg.end(), "{patron}: checkpoint past end");
    }

    assert_eq!(pool.ledger().total_principal(), cfg.total_principal());
    assert!(cfg.total_principal() <= cfg.hard_cap());

    let balance = pool.treasury().balance();
    if cfg.is_swept() {
        assert_eq!(balance, pool.outstanding(cfg.end()).unwrap());
    } else {
        let expected = cfg.reward_budget() + cfg.total_principal() - cfg.interest_paid();
        assert_eq!(balance, expected, "treasury balance drifted");
        assert!(balance >= pool.outstanding(now).unwrap(), "treasury cannot cover patrons");
    }
}
