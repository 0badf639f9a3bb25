//! JSON persistence of a whole pool.
//!
//! A snapshot is written to a sibling temp file and renamed into place, so
//! a crash mid-write leaves the previous snapshot intact.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::pool::StakingPool;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot io: {0}")] Io(#[from] std::io::Error),
    #[error("snapshot encoding: {0}")] Json(#[from] serde_json::Error),
}

/// Write `pool` to `path` as pretty-printed JSON.
pub fn save<T: Serialize>(pool: &StakingPool<T>, path: &Path) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_vec_pretty(pool)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read a pool previously written by [`save`].
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<StakingPool<T>, SnapshotError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
