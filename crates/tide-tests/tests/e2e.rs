//! End-to-end lifecycle tests for the Tide staking pool.
//!
//! Each test deploys a pool over an in-memory treasury, drives it through
//! stakes, withdrawals and the sweep, and checks the pool-wide accounting
//! invariants along the way.

use tide_core::constants::{PERIOD_SECONDS, UNIT};
use tide_core::error::{PoolError, TransferError};
use tide_core::traits::{InterestCalculator, Treasury};
use tide_core::types::RewardFunding;
use tide_interest::CompoundEngine;
use tide_pool::snapshot;
use tide_tests::helpers::*;

#[test]
fn e2e_single_patron_full_window() {
    let mut pool = standard_pool();
    let patron = addr(1);

    pool.stake(&patron, UNIT, START).unwrap();
    let (principal, accrued) = pool.total(&patron, END).unwrap();
    assert_eq!(principal, UNIT);
    assert_eq!(accrued, pool.compound(UNIT, START, END).unwrap());
    assert!(accrued > UNIT);
    assert_invariants(&pool, END);
}

#[test]
fn e2e_second_stake_before_time_passes() {
    let mut pool = standard_pool();
    let patron = addr(1);

    pool.stake(&patron, UNIT, START).unwrap();
    pool.stake(&patron, UNIT, START).unwrap();
    assert_eq!(pool.total(&patron, START).unwrap(), (2 * UNIT, 2 * UNIT));
    assert_eq!(pool.ledger().len(), 1);
}

#[test]
fn e2e_late_stake_earns_from_its_own_checkpoint() {
    let mut pool = standard_pool();
    let patron = addr(1);
    let mid = START + 360 * PERIOD_SECONDS;

    pool.stake(&patron, 10 * UNIT, START).unwrap();
    pool.stake(&patron, 10 * UNIT, mid).unwrap();

    let engine = CompoundEngine::new(RATE);
    let at_mid = engine.compound(10 * UNIT, 360).unwrap() + 10 * UNIT;
    let expected = engine.compound(at_mid, 360).unwrap();
    assert_eq!(pool.total(&patron, END).unwrap(), (20 * UNIT, expected));
}

#[test]
fn e2e_accrual_frozen_after_end() {
    let mut pool = standard_pool();
    pool.stake(&addr(1), 5 * UNIT, START).unwrap();
    let at_end = pool.total(&addr(1), END).unwrap();
    assert_eq!(pool.total(&addr(1), END + 1).unwrap(), at_end);
    assert_eq!(pool.total(&addr(1), END + 1_000 * PERIOD_SECONDS).unwrap(), at_end);
}

#[test]
fn e2e_monotonic_accrual_without_withdrawals() {
    let mut pool = standard_pool();
    pool.stake(&addr(1), 3 * UNIT, START).unwrap();
    let mut last = 0;
    for hour in 0..=PERIODS + 5 {
        let (_, accrued) = pool.total(&addr(1), START + hour * PERIOD_SECONDS).unwrap();
        assert!(accrued >= last);
        last = accrued;
    }
}

#[test]
fn e2e_view_does_not_mutate() {
    let mut pool = standard_pool();
    pool.stake(&addr(1), UNIT, START).unwrap();
    let before = pool.clone();
    let first = pool.total(&addr(1), START + 99 * PERIOD_SECONDS).unwrap();
    let second = pool.total(&addr(1), START + 99 * PERIOD_SECONDS).unwrap();
    assert_eq!(first, second);
    assert_eq!(pool, before);
}

// ---------------------------------------------------------------------------
// Boundaries
// ---------------------------------------------------------------------------

#[test]
fn e2e_hard_cap_boundary() {
    let mut pool = standard_pool();
    pool.stake(&addr(1), CONTRIBUTION_LIMIT, START).unwrap();
    pool.stake(&addr(2), HARD_CAP - CONTRIBUTION_LIMIT, START).unwrap();
    assert_eq!(pool.config().total_principal(), HARD_CAP);

    let before = pool.clone();
    assert_eq!(pool.stake(&addr(3), 1, START).unwrap_err(), PoolError::PoolFull);
    assert_eq!(pool.stake(&addr(3), 1, START).unwrap_err().to_string(), "Staking pool is full");
    assert_eq!(pool, before);
}

#[test]
fn e2e_contribution_limit_boundary() {
    let mut pool = standard_pool();
    pool.stake(&addr(1), CONTRIBUTION_LIMIT, START).unwrap();
    let err = pool.stake(&addr(1), 1, START).unwrap_err();
    assert_eq!(err, PoolError::OverContributionLimit);
    assert_eq!(err.to_string(), "Stake greater than contribution limit");
}

#[test]
fn e2e_pool_full_checked_before_contribution_limit() {
    let mut pool = standard_pool();
    pool.stake(&addr(1), CONTRIBUTION_LIMIT, START).unwrap();
    pool.stake(&addr(2), CONTRIBUTION_LIMIT, START).unwrap();
    // Over both bounds: the pool-wide cap is reported.
    assert_eq!(
        pool.stake(&addr(1), CONTRIBUTION_LIMIT, START).unwrap_err(),
        PoolError::PoolFull
    );
}

#[test]
fn e2e_window_boundary() {
    let mut pool = standard_pool();
    assert_eq!(
        pool.stake(&addr(1), UNIT, START - 1).unwrap_err().to_string(),
        "Staking pool not yet started"
    );
    pool.stake(&addr(1), UNIT, START).unwrap();
    pool.stake(&addr(2), UNIT, END).unwrap();
    assert_eq!(
        pool.stake(&addr(3), UNIT, END + 1).unwrap_err().to_string(),
        "Staking pool already expired"
    );
    assert_invariants(&pool, END);
}

#[test]
fn e2e_stake_before_init() {
    let mut pool = Pool::new(owner(), tide_pool::MemoryTreasury::new());
    let err = pool.stake(&addr(1), UNIT, START).unwrap_err();
    assert_eq!(err.to_string(), "Staking Pool not initialized");
    assert_eq!(
        pool.unstake(&addr(1), UNIT, START).unwrap_err(),
        PoolError::NotInitialized
    );
}

// ---------------------------------------------------------------------------
// Withdrawals
// ---------------------------------------------------------------------------

#[test]
fn e2e_partial_withdrawal_law() {
    let mut pool = standard_pool();
    let patron = addr(1);
    let p = 10 * UNIT;
    let t = START + 400 * PERIOD_SECONDS;

    pool.stake(&patron, p, START).unwrap();
    let (_, a) = pool.total(&patron, t).unwrap();
    assert!(a > p);

    let w1 = p / 2;
    pool.unstake(&patron, w1, t).unwrap();
    assert_eq!(pool.total(&patron, t).unwrap(), (p - w1, a - w1));

    pool.unstake(&patron, w1, t).unwrap();
    assert_eq!(pool.total(&patron, t).unwrap(), (0, a - p));

    pool.unstake(&patron, a - p, t).unwrap();
    assert_eq!(pool.total(&patron, t).unwrap(), (0, 0));
    assert_eq!(pool.treasury().paid_to(&patron), a);
    assert_invariants(&pool, t);
}

#[test]
fn e2e_interest_only_record_keeps_compounding() {
    let mut pool = standard_pool();
    let patron = addr(1);
    let t = START + 100 * PERIOD_SECONDS;

    pool.stake(&patron, 10 * UNIT, START).unwrap();
    pool.unstake(&patron, 10 * UNIT, t).unwrap();
    let (principal, left) = pool.total(&patron, t).unwrap();
    assert_eq!(principal, 0);
    assert!(left > 0);

    let (_, later) = pool.total(&patron, END).unwrap();
    assert_eq!(later, CompoundEngine::new(RATE).compound(left, PERIODS - 100).unwrap());
}

#[test]
fn e2e_unstake_all_drains_and_registry_keeps_patron() {
    let mut pool = standard_pool();
    pool.stake(&addr(1), 7 * UNIT, START).unwrap();
    let paid = pool.unstake_all(&addr(1), START + 10 * PERIOD_SECONDS).unwrap();
    assert!(paid > 7 * UNIT);
    assert!(pool.ledger().contains(&addr(1)));
    assert!(pool.ledger().get(&addr(1)).unwrap().is_drained());
    assert_eq!(
        pool.unstake_all(&addr(1), START + 11 * PERIOD_SECONDS).unwrap_err().to_string(),
        "No funds available"
    );
}

#[test]
fn e2e_unstake_errors_leave_state_untouched() {
    let mut pool = standard_pool();
    pool.stake(&addr(1), UNIT, START).unwrap();
    let before = pool.clone();

    assert_eq!(pool.unstake(&addr(2), 1, START).unwrap_err(), PoolError::NoFundsAvailable);
    assert_eq!(pool.unstake(&addr(1), 0, START).unwrap_err(), PoolError::NoFundsAvailable);
    assert_eq!(
        pool.unstake(&addr(1), UNIT + 1, START).unwrap_err(),
        PoolError::NoFundsAvailable
    );
    assert_eq!(pool, before);
}

#[test]
fn e2e_rejected_payout_rolls_back() {
    let mut pool = standard_pool();
    pool.stake(&addr(1), UNIT, START).unwrap();
    pool.treasury_mut().set_rejecting(addr(1), true);
    let before_record = *pool.ledger().get(&addr(1)).unwrap();
    let before_config = pool.config().clone();

    let err = pool.unstake(&addr(1), UNIT, START + 5 * PERIOD_SECONDS).unwrap_err();
    assert!(matches!(err, PoolError::Transfer(TransferError::Rejected(_))));
    assert_eq!(*pool.ledger().get(&addr(1)).unwrap(), before_record);
    assert_eq!(*pool.config(), before_config);
    assert_invariants(&pool, START + 5 * PERIOD_SECONDS);
}

// ---------------------------------------------------------------------------
// Sweep
// ---------------------------------------------------------------------------

#[test]
fn e2e_sweep_exactly_once() {
    let mut pool = standard_pool();
    pool.stake(&addr(1), UNIT, START).unwrap();
    assert_eq!(
        pool.sweep(&owner(), END).unwrap_err().to_string(),
        "Cannot sweep before expiry"
    );
    pool.sweep(&owner(), END + 1).unwrap();
    for later in [END + 1, END + 2, END + 365 * 24 * PERIOD_SECONDS] {
        assert_eq!(pool.sweep(&owner(), later).unwrap_err().to_string(), "Already sweeped");
    }
}

#[test]
fn e2e_sweep_by_stranger_rejected() {
    let mut pool = standard_pool();
    let before = pool.clone();
    assert_eq!(
        pool.sweep(&addr(9), END + 1).unwrap_err().to_string(),
        "OnlyOwner: Not authorized"
    );
    assert_eq!(pool, before);
}

#[test]
fn e2e_reward_conservation_many_patrons() {
    let mut pool = standard_pool();
    let budget = pool.config().reward_budget();

    pool.stake(&addr(1), 20 * UNIT, START).unwrap();
    pool.stake(&addr(2), 15 * UNIT, START + 17 * PERIOD_SECONDS).unwrap();
    pool.stake(&addr(3), 40 * UNIT, START + 200 * PERIOD_SECONDS + 59).unwrap();
    pool.unstake(&addr(2), 5 * UNIT, START + 300 * PERIOD_SECONDS).unwrap();
    pool.stake(&addr(1), 10 * UNIT, START + 500 * PERIOD_SECONDS).unwrap();
    pool.stake(&addr(4), UNIT, END).unwrap();
    assert_invariants(&pool, END);

    let owed: u128 = pool
        .ledger()
        .iter()
        .map(|(patron, _)| {
            let (p, a) = pool.total(patron, END).unwrap();
            a - p
        })
        .sum();

    let report = pool.sweep(&owner(), END + 10).unwrap();
    assert_eq!(report.owed_interest, owed);
    assert_eq!(report.interest_paid, 0);
    assert_eq!(budget, report.amount_to_owner + owed);
    assert_eq!(pool.treasury().paid_to(&owner()), report.amount_to_owner);
    assert_invariants(&pool, END + 10);
}

#[test]
fn e2e_solvency_after_sweep() {
    let mut pool = standard_pool();
    let patrons = [addr(1), addr(2), addr(3)];
    pool.stake(&patrons[0], 30 * UNIT, START).unwrap();
    pool.stake(&patrons[1], 30 * UNIT, START + 50 * PERIOD_SECONDS).unwrap();
    pool.stake(&patrons[2], 30 * UNIT, START + 700 * PERIOD_SECONDS).unwrap();

    // Withdraw all principal plus most of the interest, leaving a sliver.
    let t = START + 600 * PERIOD_SECONDS;
    let (_, accrued) = pool.total(&patrons[0], t).unwrap();
    pool.unstake(&patrons[0], accrued - UNIT / 100, t).unwrap();
    assert_eq!(pool.total(&patrons[0], t).unwrap(), (0, UNIT / 100));

    let report = pool.sweep(&owner(), END + 1).unwrap();
    assert!(report.interest_paid > 0);
    assert_eq!(
        pool.treasury().balance(),
        report.total_principal + report.owed_interest
    );

    for (i, patron) in patrons.iter().enumerate() {
        pool.unstake_all(patron, END + 2 + i as u64).unwrap();
        assert_invariants(&pool, END + 2 + i as u64);
    }
    assert_eq!(pool.treasury().balance(), 0);
}

#[test]
fn e2e_worst_case_budget_survives_periodic_touches() {
    for step in 1..=60u64 {
        let mut pool = standard_pool();
        pool.stake(&addr(1), CONTRIBUTION_LIMIT, START).unwrap();
        pool.stake(&addr(2), HARD_CAP - CONTRIBUTION_LIMIT, START).unwrap();

        let mut hour = step;
        while hour <= PERIODS {
            let now = START + hour * PERIOD_SECONDS;
            pool.stake(&addr(1), 0, now).unwrap();
            pool.stake(&addr(2), 0, now).unwrap();
            hour += step;
        }

        let budget = pool.config().reward_budget();
        let report = pool
            .sweep(&owner(), END + 1)
            .unwrap_or_else(|e| panic!("step {step}: {e}"));
        assert_eq!(budget, report.amount_to_owner + report.owed_interest);
        assert_invariants(&pool, END + 1);
    }
}

#[test]
fn e2e_declared_budget_lifecycle() {
    let budget = worst_case(&params()) + UNIT;
    let mut pool = deploy(params(), RewardFunding::Declared(budget));
    assert_eq!(pool.config().reward_budget(), budget);

    pool.stake(&addr(1), 50 * UNIT, START).unwrap();
    pool.stake(&addr(2), 50 * UNIT, START).unwrap();
    let report = pool.sweep(&owner(), END + 1).unwrap();
    assert!(report.amount_to_owner >= UNIT);
    pool.unstake_all(&addr(1), END + 2).unwrap();
    pool.unstake_all(&addr(2), END + 2).unwrap();
    assert_eq!(pool.treasury().balance(), 0);
}

#[test]
fn e2e_ownership_handover_then_sweep() {
    let mut pool = standard_pool();
    pool.change_owner(&owner(), addr(42)).unwrap();
    assert_eq!(
        pool.change_owner(&addr(42), addr(42)).unwrap_err().to_string(),
        "changeOwner: already owner"
    );
    assert_eq!(pool.sweep(&owner(), END + 1).unwrap_err(), PoolError::NotAuthorized);
    let report = pool.sweep(&addr(42), END + 1).unwrap();
    assert_eq!(pool.treasury().paid_to(&addr(42)), report.amount_to_owner);
}

// ---------------------------------------------------------------------------
// Precision and persistence
// ---------------------------------------------------------------------------

#[test]
fn e2e_compounding_precision_thirty_days() {
    let engine = CompoundEngine::new(RATE);
    let value = engine.compound(50_000 * UNIT, 720).unwrap();

    let exact = 50_000f64 * (1.0f64 + 0.0000225).powi(720);
    let got = value as f64 / UNIT as f64;
    assert!((got - exact).abs() <= 0.001, "got {got}, exact {exact}");
}

#[test]
fn e2e_snapshot_resumes_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pool.json");

    let mut pool = standard_pool();
    pool.stake(&addr(1), 12 * UNIT, START).unwrap();
    snapshot::save(&pool, &path).unwrap();

    let mut resumed: Pool = snapshot::load(&path).unwrap();
    assert_eq!(resumed, pool);
    resumed.stake(&addr(2), 3 * UNIT, START + PERIOD_SECONDS).unwrap();
    resumed.sweep(&owner(), END + 1).unwrap();
    snapshot::save(&resumed, &path).unwrap();

    let reloaded: Pool = snapshot::load(&path).unwrap();
    assert!(reloaded.config().is_swept());
    assert_invariants(&reloaded, END + 1);
}
