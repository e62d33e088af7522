//! Two-slot generations
//!
//! A [`Generations`] pairs a "current" path with a "backup" path. The only
//! way to move data between them is [`Generations::rotate`], which always
//! discards the old backup before demoting current, so at most one backup
//! exists. Works for both files and directories.

use crate::storage::error::StorageResult;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Generations {
    current: PathBuf,
    backup: PathBuf,
}

impl Generations {
    pub fn new(current: impl Into<PathBuf>, backup: impl Into<PathBuf>) -> Self {
        Self {
            current: current.into(),
            backup: backup.into(),
        }
    }

    pub fn current(&self) -> &Path {
        &self.current
    }

    pub fn backup(&self) -> &Path {
        &self.backup
    }

    /// Drop the backup, then move current into its place.
    ///
    /// Leaves the current slot empty.
    pub fn rotate(&self) -> StorageResult<()> {
        remove_slot(&self.backup)?;

        if self.current.exists() {
            std::fs::rename(&self.current, &self.backup)?;
            tracing::info!("Rotated {:?} -> {:?}", self.current, self.backup);
        }

        Ok(())
    }
}

fn remove_slot(path: &Path) -> StorageResult<()> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    if meta.is_dir() {
        std::fs::remove_dir_all(path)?;
    } else {
        std::fs::remove_file(path)?;
    }
    tracing::info!("Removed {:?}", path);
    Ok(())
}
