//! Post-expiry reward reconciliation.
//!
//! After the window closes the owner may release, exactly once, the part of
//! the reward budget no patron will ever claim. Each registered patron's
//! accrued value is replayed to the pool's end; the interest still owed to
//! patrons, plus interest they have already withdrawn, stays in the pool.
//!
//! Conservation: `reward_budget == amount_to_owner + owed_interest + interest_paid`.
//! After the sweep the treasury holds exactly `total_principal + owed_interest`.

use serde::{Deserialize, Serialize};
use tide_core::error::{ArithmeticError, PoolError};
use tide_core::traits::Treasury;
use tide_core::types::{Address, Timestamp};
use tracing::{info, warn};

use crate::ledger;
use crate::pool::StakingPool;

/// Pool-wide totals at the pool's end, and the resulting owner payout.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SweepReport {
    /// Patrons visited.
    pub patrons: usize,
    /// Sum of principal over all patrons.
    pub total_principal: u128,
    /// Sum of accrued value at the pool's end over all patrons.
    pub total_accrued: u128,
    /// `total_accrued - total_principal`: interest patrons can still redeem.
    pub owed_interest: u128,
    /// Interest already withdrawn by patrons before reconciliation.
    pub interest_paid: u128,
    /// Unclaimed reward budget released to the owner.
    pub amount_to_owner: u128,
}

impl<T: Treasury> StakingPool<T> {
    /// Compute the sweep totals without moving anything.
    pub fn reconcile(&self) -> Result<SweepReport, PoolError> {
        let end = self.config.end;
        let mut report = SweepReport {
            interest_paid: self.config.interest_paid,
            ..SweepReport::default()
        };

        for (_, record) in self.ledger.iter() {
            let (principal, accrued) = ledger::view(record, end, &self.config)?;
            report.patrons += 1;
            report.total_principal = report
                .total_principal
                .checked_add(principal)
                .ok_or(ArithmeticError::Overflow)?;
            report.total_accrued = report
                .total_accrued
                .checked_add(accrued)
                .ok_or(ArithmeticError::Overflow)?;
        }

        // principal <= accrued per record, so the sums keep that order.
        report.owed_interest = report.total_accrued - report.total_principal;

        let owed = report
            .owed_interest
            .checked_add(report.interest_paid)
            .ok_or(ArithmeticError::Overflow)?;
        report.amount_to_owner =
            self.config
                .reward_budget
                .checked_sub(owed)
                .ok_or(PoolError::BudgetShortfall {
                    budget: self.config.reward_budget,
                    owed,
                })?;
        Ok(report)
    }

    /// Release the unclaimed reward budget to the owner.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotInitialized`] before init
    /// - [`PoolError::NotAuthorized`] unless `caller` is the owner
    /// - [`PoolError::SweepBeforeExpiry`] unless `now > end`
    /// - [`PoolError::AlreadySwept`] on any call after a successful sweep
    /// - [`PoolError::Transfer`] if the payout fails (the pool stays unswept)
    pub fn sweep(&mut self, caller: &Address, now: Timestamp) -> Result<SweepReport, PoolError> {
        if !self.config.initialized {
            return Err(PoolError::NotInitialized);
        }
        self.only_owner(caller)?;
        if now <= self.config.end {
            return Err(PoolError::SweepBeforeExpiry);
        }
        if self.config.swept {
            return Err(PoolError::AlreadySwept);
        }

        let report = self.reconcile()?;

        self.config.swept = true;
        self.config.swept_amount = report.amount_to_owner;

        let owner = self.config.owner;
        if let Err(e) = self.treasury.disburse(&owner, report.amount_to_owner) {
            warn!(%owner, amount = report.amount_to_owner, error = %e, "sweep: payout failed, reverting");
            self.config.swept = false;
            self.config.swept_amount = 0;
            return Err(e.into());
        }

        info!(
            %owner,
            now,
            patrons = report.patrons,
            total_principal = report.total_principal,
            owed_interest = report.owed_interest,
            interest_paid = report.interest_paid,
            amount_to_owner = report.amount_to_owner,
            "sweep: unclaimed rewards released"
        );
        Ok(report)
    }
}
