//! In-memory currency custody.
//!
//! [`MemoryTreasury`] tracks the pool's balance and what each recipient has
//! been paid. Recipients can be marked as rejecting so a failed outbound
//! transfer (a reverting receiver) can be exercised.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tide_core::error::TransferError;
use tide_core::traits::Treasury;
use tide_core::types::Address;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryTreasury {
    /// Currency held by the pool.
    balance: u128,
    /// Cumulative amount received, by sender.
    received: BTreeMap<Address, u128>,
    /// Cumulative amount paid out, by recipient.
    paid: BTreeMap<Address, u128>,
    /// Recipients whose incoming transfers fail.
    #[serde(default)]
    rejecting: BTreeSet<Address>,
}

impl MemoryTreasury {
    /// Create an empty treasury.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total ever paid to `recipient`.
    pub fn paid_to(&self, recipient: &Address) -> u128 {
        self.paid.get(recipient).copied().unwrap_or(0)
    }

    /// Total ever received from `sender`.
    pub fn received_from(&self, sender: &Address) -> u128 {
        self.received.get(sender).copied().unwrap_or(0)
    }

    /// Make transfers to `recipient` fail (or succeed again).
    pub fn set_rejecting(&mut self, recipient: Address, rejecting: bool) {
        if rejecting {
            self.rejecting.insert(recipient);
        } else {
            self.rejecting.remove(&recipient);
        }
    }
}

impl Treasury for MemoryTreasury {
    fn balance(&self) -> u128 {
        self.balance
    }

    fn accept(&mut self, from: &Address, amount: u128) -> Result<(), TransferError> {
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| TransferError::Rejected(from.to_string()))?;
        self.balance = balance;
        let total = self.received.entry(*from).or_insert(0);
        *total = total.saturating_add(amount);
        Ok(())
    }

    fn disburse(&mut self, to: &Address, amount: u128) -> Result<(), TransferError> {
        if self.rejecting.contains(to) {
            return Err(TransferError::Rejected(to.to_string()));
        }
        let balance = self
            .balance
            .checked_sub(amount)
            .ok_or(TransferError::InsufficientBalance {
                have: self.balance,
                need: amount,
            })?;
        self.balance = balance;
        let total = self.paid.entry(*to).or_insert(0);
        *total = total.saturating_add(amount);
        Ok(())
    }
}
