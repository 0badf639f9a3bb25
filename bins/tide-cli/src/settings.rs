//! Pool settings for `tide init` and `tide budget`.
//!
//! Loaded from a TOML file, then overridden by `TIDE_`-prefixed environment
//! variables (`TIDE_HARD_CAP=500`, `TIDE_OWNER=0x...`). Amounts and the rate
//! are decimal-unit strings so they survive TOML without float rounding.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tide_core::types::{Address, PoolParams, RewardFunding, Timestamp};
use tide_core::units::parse_units;

/// Environment variable prefix for setting overrides.
pub const ENV_PREFIX: &str = "TIDE";

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PoolSettings {
    /// Owner after init, `0x`-prefixed hex.
    pub owner: String,
    /// Opening time, Unix seconds.
    pub start: Timestamp,
    /// Closing time, Unix seconds.
    pub end: Timestamp,
    /// Per-period rate as a decimal fraction, e.g. `"0.0000225"`.
    pub rate_per_period: String,
    pub hard_cap: String,
    pub contribution_limit: String,
    /// Declared reward budget. Absent means "fund the worst case".
    #[serde(default)]
    pub reward_budget: Option<String>,
}

impl PoolSettings {
    /// Load settings from `path`, applying environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("Failed to read pool settings: {}", path.display()))?;
        settings
            .try_deserialize()
            .context("Invalid pool settings")
    }

    /// Convert into typed pool parameters.
    pub fn to_params(&self) -> Result<PoolParams> {
        let owner = self
            .owner
            .parse::<Address>()
            .with_context(|| format!("Invalid owner address: {}", self.owner))?;
        if owner.is_zero() {
            bail!("Owner must not be the zero address");
        }
        Ok(PoolParams {
            owner,
            start: self.start,
            end: self.end,
            rate_per_period: parse_units(&self.rate_per_period)
                .with_context(|| format!("Invalid rate_per_period: {}", self.rate_per_period))?,
            hard_cap: parse_units(&self.hard_cap)
                .with_context(|| format!("Invalid hard_cap: {}", self.hard_cap))?,
            contribution_limit: parse_units(&self.contribution_limit).with_context(|| {
                format!("Invalid contribution_limit: {}", self.contribution_limit)
            })?,
        })
    }

    /// How the reward budget is determined at init.
    pub fn funding(&self) -> Result<RewardFunding> {
        match &self.reward_budget {
            Some(b) => Ok(RewardFunding::Declared(
                parse_units(b).with_context(|| format!("Invalid reward_budget: {b}"))?,
            )),
            None => Ok(RewardFunding::WorstCase),
        }
    }
}

/// Default location of the pool state file.
pub fn default_state_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tide")
        .join("pool.json")
}
