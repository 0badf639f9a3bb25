//! Core pool types: identities, patron records, pool parameters.
//!
//! All monetary values are in base units (1 unit = 10^18 base units).
//! Timestamps are Unix seconds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AddressError;

/// Unix timestamp in seconds, supplied by the caller's execution context.
pub type Timestamp = u64;

/// A 20-byte account identity (patron, owner or deployer).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Check if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Parse a `0x`-prefixed, 40-hex-digit address.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(AddressError::MissingPrefix)?;
        let bytes = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let arr: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-patron accounting record.
///
/// Invariants: `principal <= accrued`, `checkpoint <= end` of the owning pool.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PatronRecord {
    /// Net deposited amount, exclusive of interest.
    pub principal: u128,
    /// Principal plus interest compounded through `checkpoint`.
    pub accrued: u128,
    /// Timestamp of the last recompute.
    pub checkpoint: Timestamp,
}

impl PatronRecord {
    /// A fresh, empty record anchored at `checkpoint`.
    pub fn new(checkpoint: Timestamp) -> Self {
        Self {
            principal: 0,
            accrued: 0,
            checkpoint,
        }
    }

    /// Interest earned and not yet withdrawn, as of `checkpoint`.
    pub fn interest(&self) -> u128 {
        self.accrued.saturating_sub(self.principal)
    }

    /// Whether everything has been withdrawn.
    pub fn is_drained(&self) -> bool {
        self.principal == 0 && self.accrued == 0
    }
}

/// Parameters fixed at pool initialization.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PoolParams {
    /// Identity authorized to sweep and reassign ownership after init.
    pub owner: Address,
    /// First instant at which stakes are accepted (inclusive).
    pub start: Timestamp,
    /// Last instant at which stakes are accepted (inclusive); accrual stops here.
    pub end: Timestamp,
    /// Interest per period on the [`WAD`](crate::constants::WAD) scale.
    pub rate_per_period: u128,
    /// Maximum sum of all patrons' principal.
    pub hard_cap: u128,
    /// Maximum principal per patron.
    pub contribution_limit: u128,
}

impl PoolParams {
    /// Window length in seconds (`end - start`), zero for an inverted window.
    pub fn duration(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

/// How the reward budget is determined at init.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewardFunding {
    /// Caller declares the budget; received currency must match it.
    Declared(u128),
    /// Budget is the worst-case interest: `compound(hard_cap, start, end) - hard_cap`.
    WorstCase,
}
