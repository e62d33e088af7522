//! Tag Index Store
//!
//! Get/put of the whole [`TagIndex`] under the `"tag"` key. Saving is a full
//! rewrite, never a merge. Moving the previous file aside is the ingest
//! pass's job, not this store's.

use crate::index::TagIndex;
use crate::storage::error::StorageResult;
use crate::storage::keyed::KeyedStore;
use std::path::{Path, PathBuf};

const TAG_KEY: &str = "tag";

#[derive(Debug, Clone)]
pub struct TagIndexStore {
    inner: KeyedStore<TagIndex>,
}

impl TagIndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: KeyedStore::new(path, TAG_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Persisted index, or an empty one if none was saved
    pub fn load(&self) -> StorageResult<TagIndex> {
        Ok(self.inner.load()?.unwrap_or_default())
    }

    pub fn save(&self, index: &TagIndex) -> StorageResult<()> {
        self.inner.save(index)?;
        tracing::info!(
            "Saved {} tags ({} mentions) to {:?}",
            index.tag_count(),
            index.mention_count(),
            self.path()
        );
        Ok(())
    }
}
