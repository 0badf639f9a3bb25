//! Stake controller: init, stake, unstake and ownership for a single pool.
//!
//! Every operation checks all of its preconditions before touching state,
//! then commits its ledger and counter changes, and only then moves
//! currency out through the [`Treasury`]. If an outbound transfer fails the
//! committed changes are restored, so an operation either completes in full
//! or leaves no trace.
//!
//! Operations take `&mut self`, and the treasury is owned by the pool, so a
//! treasury implementation cannot re-enter the pool mid-transfer.

use serde::{Deserialize, Serialize};
use tide_core::error::{ArithmeticError, PoolError};
use tide_core::traits::Treasury;
use tide_core::types::{Address, PatronRecord, PoolParams, RewardFunding, Timestamp};
use tide_interest::CompoundEngine;
use tracing::{debug, info, warn};

use crate::config::PoolConfig;
use crate::ledger::{self, PatronLedger};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StakingPool<T> {
    pub(crate) config: PoolConfig,
    pub(crate) ledger: PatronLedger,
    pub(crate) treasury: T,
}

impl<T: Treasury> StakingPool<T> {
    /// Construct an uninitialized pool owned by `deployer`.
    pub fn new(deployer: Address, treasury: T) -> Self {
        Self {
            config: PoolConfig::uninitialized(deployer),
            ledger: PatronLedger::new(),
            treasury,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn ledger(&self) -> &PatronLedger {
        &self.ledger
    }

    pub fn treasury(&self) -> &T {
        &self.treasury
    }

    pub fn treasury_mut(&mut self) -> &mut T {
        &mut self.treasury
    }

    pub fn owner(&self) -> Address {
        self.config.owner
    }

    pub(crate) fn only_owner(&self, caller: &Address) -> Result<(), PoolError> {
        if *caller != self.config.owner {
            debug!(%caller, owner = %self.config.owner, "pool: caller is not owner");
            return Err(PoolError::NotAuthorized);
        }
        Ok(())
    }

    /// Initialize the pool and take custody of the reward budget.
    ///
    /// `received` is the currency sent along with the call. Returns the
    /// reward budget.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotAuthorized`] if `caller` is not the deployer/owner
    /// - [`PoolError::AlreadyInitialized`] on a second call
    /// - [`PoolError::InvalidWindow`] unless `start < end`
    /// - [`PoolError::InvalidRate`] for a zero rate
    /// - [`PoolError::RewardBudgetMismatch`] if `received` differs from the budget
    pub fn init(
        &mut self,
        caller: &Address,
        params: PoolParams,
        funding: RewardFunding,
        received: u128,
        now: Timestamp,
    ) -> Result<u128, PoolError> {
        self.only_owner(caller)?;
        if self.config.initialized {
            return Err(PoolError::AlreadyInitialized);
        }
        if params.start >= params.end {
            return Err(PoolError::InvalidWindow {
                start: params.start,
                end: params.end,
            });
        }
        if params.rate_per_period == 0 {
            return Err(PoolError::InvalidRate);
        }

        let expected = match funding {
            RewardFunding::Declared(budget) => budget,
            RewardFunding::WorstCase => CompoundEngine::new(params.rate_per_period)
                .worst_case_interest(params.hard_cap, params.start, params.end)?,
        };
        if received != expected {
            return Err(PoolError::RewardBudgetMismatch { expected, received });
        }

        self.treasury.accept(caller, received)?;
        self.config.apply(&params, expected);

        info!(
            event = "StakingPoolInitialized",
            reward_budget = expected,
            now,
            owner = %params.owner,
            start = params.start,
            end = params.end,
            "pool: initialized"
        );
        Ok(expected)
    }

    /// Deposit `amount` for `patron` at `now`.
    ///
    /// Preconditions are checked in order, each with its own error:
    /// initialized, started, not expired, hard cap, contribution limit.
    /// Returns the patron's updated record.
    pub fn stake(
        &mut self,
        patron: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<PatronRecord, PoolError> {
        let cfg = &self.config;
        if !cfg.initialized {
            return Err(PoolError::NotInitialized);
        }
        if now < cfg.start {
            return Err(PoolError::NotStarted);
        }
        if now > cfg.end {
            return Err(PoolError::Expired);
        }

        let new_total = match cfg.total_principal.checked_add(amount) {
            Some(total) if total <= cfg.hard_cap => total,
            _ => {
                debug!(%patron, amount, total = cfg.total_principal, cap = cfg.hard_cap, "pool: stake over hard cap");
                return Err(PoolError::PoolFull);
            }
        };

        let mut record = self
            .ledger
            .get(patron)
            .copied()
            .unwrap_or_else(|| PatronRecord::new(now));
        match record.principal.checked_add(amount) {
            Some(p) if p <= cfg.contribution_limit => {}
            _ => {
                debug!(%patron, amount, principal = record.principal, limit = cfg.contribution_limit, "pool: stake over contribution limit");
                return Err(PoolError::OverContributionLimit);
            }
        }

        ledger::catch_up(&mut record, now, cfg)?;
        // Bounded by the contribution limit check above.
        record.principal += amount;
        record.accrued = record
            .accrued
            .checked_add(amount)
            .ok_or(ArithmeticError::Overflow)?;

        self.treasury.accept(patron, amount)?;
        let is_new = self.ledger.upsert(*patron, record);
        self.config.total_principal = new_total;

        info!(
            event = "StakeAdded",
            %patron,
            amount,
            now,
            new_patron = is_new,
            total_principal = new_total,
            "pool: stake added"
        );
        Ok(record)
    }

    /// Withdraw `amount` of `patron`'s accrued value at `now`.
    ///
    /// Principal is drawn down first; once it reaches zero the remainder
    /// comes purely from interest. Returns the patron's updated record.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotInitialized`] before init
    /// - [`PoolError::NoFundsAvailable`] for an unknown patron, a zero
    ///   amount, or more than the patron's accrued value
    /// - [`PoolError::Transfer`] if the payout fails (state is restored)
    pub fn unstake(
        &mut self,
        patron: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<PatronRecord, PoolError> {
        if !self.config.initialized {
            return Err(PoolError::NotInitialized);
        }
        let Some(before) = self.ledger.get(patron).copied() else {
            return Err(PoolError::NoFundsAvailable);
        };
        if amount == 0 {
            return Err(PoolError::NoFundsAvailable);
        }

        let mut record = before;
        ledger::catch_up(&mut record, now, &self.config)?;
        if amount > record.accrued {
            debug!(%patron, amount, accrued = record.accrued, "pool: unstake exceeds accrued");
            return Err(PoolError::NoFundsAvailable);
        }

        let new_principal = record.principal.saturating_sub(amount);
        let principal_drawn = record.principal - new_principal;
        let interest_drawn = amount - principal_drawn;
        record.accrued -= amount;
        record.principal = new_principal;

        // Effects.
        let saved_config = self.config.clone();
        self.ledger.upsert(*patron, record);
        self.config.total_principal -= principal_drawn;
        self.config.interest_paid += interest_drawn;

        // Interaction.
        if let Err(e) = self.treasury.disburse(patron, amount) {
            warn!(%patron, amount, error = %e, "pool: payout failed, reverting unstake");
            self.ledger.upsert(*patron, before);
            self.config = saved_config;
            return Err(e.into());
        }

        info!(
            %patron,
            amount,
            now,
            principal_drawn,
            interest_drawn,
            total_principal = self.config.total_principal,
            "pool: unstaked"
        );
        Ok(record)
    }

    /// Withdraw everything `patron` has accrued at `now`. Returns the amount paid.
    pub fn unstake_all(&mut self, patron: &Address, now: Timestamp) -> Result<u128, PoolError> {
        if !self.config.initialized {
            return Err(PoolError::NotInitialized);
        }
        let (_, accrued) = self.total(patron, now)?;
        self.unstake(patron, accrued, now)?;
        Ok(accrued)
    }

    /// `(principal, accrued)` for `patron` as of `now`; zeros if never staked.
    pub fn total(&self, patron: &Address, now: Timestamp) -> Result<(u128, u128), PoolError> {
        match self.ledger.get(patron) {
            Some(record) => Ok(ledger::view(record, now, &self.config)?),
            None => Ok((0, 0)),
        }
    }

    /// Compound `principal` from `from` to `to` at this pool's rate, frozen at its end.
    pub fn compound(
        &self,
        principal: u128,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<u128, PoolError> {
        Ok(self
            .config
            .engine()
            .compound_between(principal, from, to, self.config.end)?)
    }

    /// Sum of every patron's accrued value as of `now`.
    pub fn outstanding(&self, now: Timestamp) -> Result<u128, PoolError> {
        let mut total: u128 = 0;
        for (_, record) in self.ledger.iter() {
            let (_, accrued) = ledger::view(record, now, &self.config)?;
            total = total
                .checked_add(accrued)
                .ok_or(ArithmeticError::Overflow)?;
        }
        Ok(total)
    }

    /// Hand ownership to `new_owner`.
    pub fn change_owner(&mut self, caller: &Address, new_owner: Address) -> Result<(), PoolError> {
        self.only_owner(caller)?;
        if new_owner == self.config.owner {
            return Err(PoolError::AlreadyOwner);
        }
        let previous = self.config.owner;
        self.config.owner = new_owner;
        info!(
            event = "OwnershipTransferred",
            %previous,
            %new_owner,
            "pool: ownership transferred"
        );
        Ok(())
    }
}
