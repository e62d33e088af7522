//! Product cache
//!
//! Catalog code → attribute mapping, persisted under the `"amazon"` key.
//! Independent of the tag index; consulted before any external lookup.

use crate::storage::error::StorageResult;
use crate::storage::keyed::KeyedStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const PRODUCT_KEY: &str = "amazon";

/// Opaque attributes of one product
pub type ProductRecord = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct ProductCache {
    store: KeyedStore<BTreeMap<String, ProductRecord>>,
    records: BTreeMap<String, ProductRecord>,
    dirty: bool,
}

impl ProductCache {
    /// Open the cache, reading any persisted records
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let store = KeyedStore::new(path, PRODUCT_KEY);
        let records = store.load()?.unwrap_or_default();
        Ok(Self {
            store,
            records,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    pub fn get(&self, code: &str) -> Option<&ProductRecord> {
        self.records.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.records.contains_key(code)
    }

    pub fn insert(&mut self, code: impl Into<String>, record: ProductRecord) {
        self.records.insert(code.into(), record);
        self.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write all records
    pub fn persist(&mut self) -> StorageResult<()> {
        self.store.save(&self.records)?;
        self.dirty = false;
        tracing::debug!("Saved {} products to {:?}", self.records.len(), self.path());
        Ok(())
    }
}
