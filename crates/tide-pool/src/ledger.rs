//! Patron ledger: per-patron records plus the registry of every patron seen.
//!
//! Records live in an append-only arena (`Vec`) so reconciliation can visit
//! every patron exactly once in a stable order; a `HashMap` from identity to
//! arena index keeps membership unique. Records are never removed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tide_core::error::ArithmeticError;
use tide_core::traits::InterestCalculator;
use tide_core::types::{Address, PatronRecord, Timestamp};
use tide_interest::elapsed_periods;
use tracing::debug;

use crate::config::PoolConfig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("duplicate patron in ledger: {0}")] DuplicatePatron(Address),
}

/// Bring `record` up to `now`, compounding its accrued value.
///
/// Accrual is frozen at the pool's end and the checkpoint never moves
/// backwards. Principal is untouched. Calling twice with the same `now`
/// is a no-op the second time.
pub fn catch_up(
    record: &mut PatronRecord,
    now: Timestamp,
    config: &PoolConfig,
) -> Result<(), ArithmeticError> {
    let effective_now = now.min(config.end());
    let periods = elapsed_periods(
        record.checkpoint,
        effective_now,
        config.end(),
        config.period_length(),
    );
    if periods > 0 {
        let accrued = config.engine().compound(record.accrued, periods)?;
        debug!(periods, from = record.accrued, to = accrued, "ledger: caught up");
        record.accrued = accrued;
    }
    record.checkpoint = record.checkpoint.max(effective_now);
    Ok(())
}

/// Read-only `(principal, accrued)` of `record` as of `now`.
pub fn view(
    record: &PatronRecord,
    now: Timestamp,
    config: &PoolConfig,
) -> Result<(u128, u128), ArithmeticError> {
    let mut copy = *record;
    catch_up(&mut copy, now, config)?;
    Ok((copy.principal, copy.accrued))
}

/// One registry slot: a patron identity and its record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PatronEntry {
    pub patron: Address,
    pub record: PatronRecord,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(try_from = "Vec<PatronEntry>", into = "Vec<PatronEntry>")]
pub struct PatronLedger {
    /// Registry in first-stake order.
    entries: Vec<PatronEntry>,
    /// Patron → index into `entries`.
    index: HashMap<Address, usize>,
}

impl PatronLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of patrons ever registered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no patron has ever staked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, patron: &Address) -> bool {
        self.index.contains_key(patron)
    }

    /// Look up a patron's stored record (not caught up).
    pub fn get(&self, patron: &Address) -> Option<&PatronRecord> {
        self.index.get(patron).map(|&i| &self.entries[i].record)
    }

    pub(crate) fn get_mut(&mut self, patron: &Address) -> Option<&mut PatronRecord> {
        let i = *self.index.get(patron)?;
        Some(&mut self.entries[i].record)
    }

    /// Store `record` for `patron`, registering the patron if new.
    ///
    /// Returns `true` if the patron was newly registered.
    pub(crate) fn upsert(&mut self, patron: Address, record: PatronRecord) -> bool {
        if let Some(existing) = self.get_mut(&patron) {
            *existing = record;
            return false;
        }
        self.index.insert(patron, self.entries.len());
        self.entries.push(PatronEntry { patron, record });
        true
    }

    /// All registered patrons and their stored records, in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &PatronRecord)> {
        self.entries.iter().map(|e| (&e.patron, &e.record))
    }

    /// Sum of all stored principal.
    pub fn total_principal(&self) -> u128 {
        self.entries.iter().map(|e| e.record.principal).sum()
    }
}

impl TryFrom<Vec<PatronEntry>> for PatronLedger {
    type Error = LedgerError;

    fn try_from(entries: Vec<PatronEntry>) -> Result<Self, Self::Error> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.patron, i).is_some() {
                return Err(LedgerError::DuplicatePatron(entry.patron));
            }
        }
        Ok(Self { entries, index })
    }
}

impl From<PatronLedger> for Vec<PatronEntry> {
    fn from(ledger: PatronLedger) -> Self {
        ledger.entries
    }
}
