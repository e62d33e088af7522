//! Single-key JSON documents
//!
//! Both the tag index and the product cache persist one value under one
//! well-known key:
//!
//! ```json
//! { "tag": { "Ruby": [1326401059, 1326500000] } }
//! ```
//!
//! Saves are full rewrites: the document is written to a sibling temp file
//! and renamed over the target.

use crate::storage::error::StorageResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct KeyedStore<T> {
    path: PathBuf,
    key: &'static str,
    _value: PhantomData<T>,
}

impl<T> KeyedStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>, key: &'static str) -> Self {
        Self {
            path: path.into(),
            key,
            _value: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored value, `None` when nothing was ever saved under the key
    pub fn load(&self) -> StorageResult<Option<T>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut doc: Map<String, Value> = serde_json::from_reader(BufReader::new(file))?;
        match doc.remove(self.key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Replace the whole document
    pub fn save(&self, value: &T) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut doc = Map::new();
        doc.insert(self.key.to_string(), serde_json::to_value(value)?);

        let tmp = self.tmp_path();
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, &doc)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut os = self.path.as_os_str().to_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    }
}
