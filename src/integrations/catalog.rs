//! Product Catalog
//!
//! Cache-first product lookups. The bulk pass walks every product tag of the
//! tag index, one external call at a time with a pause after each, and
//! flushes the cache every few successful lookups.

use super::*;
use crate::index::TagIndex;
use crate::storage::{ProductCache, StorageResult};
use std::time::Duration;

/// Pacing of the bulk pass
#[derive(Debug, Clone, Copy)]
pub struct CatalogSettings {
    /// Pause after every external call
    pub pause: Duration,
    /// Persist after this many successful lookups
    pub flush_every: usize,
}

impl CatalogSettings {
    pub fn from_config(config: &crate::config::ProductsConfig) -> Self {
        Self {
            pause: Duration::from_millis(config.pause_ms),
            flush_every: config.flush_every.max(1),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self::from_config(&crate::config::ProductsConfig::default())
    }
}

/// Summary of a bulk pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogReport {
    /// Product tags seen
    pub candidates: usize,
    /// Already cached
    pub cached: usize,
    /// External calls answered with attributes
    pub fetched: usize,
    /// External calls answered with nothing
    pub empty: usize,
    /// Times the cache was written
    pub flushes: usize,
}

impl std::fmt::Display for CatalogReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} product tags: {} cached, {} fetched, {} not found",
            self.candidates, self.cached, self.fetched, self.empty
        )
    }
}

pub struct ProductCatalog<L: ProductLookup> {
    cache: ProductCache,
    lookup: L,
    settings: CatalogSettings,
}

impl<L: ProductLookup> ProductCatalog<L> {
    pub fn new(cache: ProductCache, lookup: L, settings: CatalogSettings) -> Self {
        Self {
            cache,
            lookup,
            settings,
        }
    }

    pub fn cache(&self) -> &ProductCache {
        &self.cache
    }

    /// Look up every uncached product tag of the index
    pub async fn sync(&mut self, tags: &TagIndex) -> StorageResult<CatalogReport> {
        let mut report = CatalogReport::default();

        for tag in tags.tags() {
            let code = match product_code(tag) {
                Some(code) => code,
                None => continue,
            };
            report.candidates += 1;

            if self.cache.contains(code) {
                tracing::debug!("{}: already examined", tag);
                report.cached += 1;
                continue;
            }

            let record = self.lookup.lookup(code).await;
            if record.is_empty() {
                tracing::info!("{}: not found", tag);
                report.empty += 1;
            } else {
                tracing::info!("{}: {} attributes", tag, record.len());
                self.cache.insert(code, record);
                report.fetched += 1;
                if report.fetched % self.settings.flush_every == 0 {
                    self.cache.persist()?;
                    report.flushes += 1;
                }
            }

            tokio::time::sleep(self.settings.pause).await;
        }

        if self.cache.is_dirty() {
            self.cache.persist()?;
            report.flushes += 1;
        }

        tracing::info!("Product pass via {}: {}", self.lookup.name(), report);
        Ok(report)
    }

    /// One code, from the cache unless `force`. Non-empty results are
    /// persisted when `save` is set.
    pub async fn lookup_one(&mut self, code: &str, force: bool, save: bool) -> StorageResult<ProductRecord> {
        if !force {
            if let Some(record) = self.cache.get(code).filter(|r| !r.is_empty()) {
                return Ok(record.clone());
            }
        }

        let record = self.lookup.lookup(code).await;
        if save && !record.is_empty() {
            self.cache.insert(code, record.clone());
            self.cache.persist()?;
        }
        Ok(record)
    }
}

/// Attribute listing followed by markup for republishing the product
pub fn render_product(record: &ProductRecord) -> String {
    let mut out = String::new();

    for (key, value) in record {
        if value.starts_with(' ') {
            out.push_str(&format!("{}:{}\n", key, value));
        } else {
            out.push_str(&format!("{}: {}\n", key, value));
        }
    }

    let is_book = record
        .get("product_group")
        .map(|g| g.to_lowercase().contains("book"))
        .unwrap_or(false);
    if is_book {
        out.push('\n');
        if let Some(ean) = record.get("ean").filter(|e| e.starts_with("978") || e.starts_with("979")) {
            out.push_str(&format!("[isbn:{}]\n", ean));
        }
        let title: String = record
            .get("title")
            .map(|t| t.chars().filter(|c| !c.is_whitespace()).collect())
            .unwrap_or_default();
        out.push_str(&format!("><a name=\"{}\">\n</a><\n#{}\n", title, title));
    }

    if let Some(asin) = record.get("asin") {
        out.push('\n');
        out.push_str(&format!("[asin:{}]\nhttp://www.amazon.co.jp/dp/{}\n", asin, asin));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Answers from a fixed table and records every call
    struct FakeLookup {
        answers: HashMap<String, ProductRecord>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeLookup {
        fn new(known: &[(&str, &str)]) -> Self {
            let answers = known
                .iter()
                .map(|(code, title)| {
                    let mut r = ProductRecord::new();
                    r.insert("title".to_string(), title.to_string());
                    (code.to_string(), r)
                })
                .collect();
            Self {
                answers,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProductLookup for FakeLookup {
        fn name(&self) -> &str {
            "fake"
        }

        async fn lookup(&self, code: &str) -> ProductRecord {
            self.calls.lock().unwrap().push(code.to_string());
            self.answers.get(code).cloned().unwrap_or_default()
        }
    }

    fn settings(flush_every: usize) -> CatalogSettings {
        CatalogSettings {
            pause: Duration::ZERO,
            flush_every,
        }
    }

    fn tags(list: &[&str]) -> TagIndex {
        let mut index = TagIndex::new();
        for (i, tag) in list.iter().enumerate() {
            index.add(tag, 1326401059 + i as i64);
        }
        index
    }

    #[tokio::test]
    async fn test_sync_caches_found_products() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("amazon.json");
        let lookup = FakeLookup::new(&[("9784000000000", "Book"), ("B000000000", "Thing")]);
        let mut catalog = ProductCatalog::new(ProductCache::open(&path).unwrap(), lookup, settings(5));

        let index = tags(&["Ruby", "isbn:9784000000000", "asin:B000000000", "asin:B999999999", "google:x"]);
        let report = catalog.sync(&index).await.unwrap();

        assert_eq!(report.candidates, 3);
        assert_eq!(report.fetched, 2);
        assert_eq!(report.empty, 1);
        assert_eq!(report.flushes, 1);
        assert_eq!(catalog.lookup.calls(), vec!["B000000000", "B999999999", "9784000000000"]);

        let reopened = ProductCache::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(!reopened.contains("B999999999"));
    }

    #[tokio::test]
    async fn test_sync_skips_cached_and_retries_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("amazon.json");
        let index = tags(&["asin:B000000000", "asin:B999999999"]);

        let first = FakeLookup::new(&[("B000000000", "Thing")]);
        ProductCatalog::new(ProductCache::open(&path).unwrap(), first, settings(5))
            .sync(&index)
            .await
            .unwrap();

        let second = FakeLookup::new(&[("B999999999", "Late")]);
        let mut catalog = ProductCatalog::new(ProductCache::open(&path).unwrap(), second, settings(5));
        let report = catalog.sync(&index).await.unwrap();

        assert_eq!(report.cached, 1);
        assert_eq!(report.fetched, 1);
        assert_eq!(catalog.lookup.calls(), vec!["B999999999"]);
    }

    #[tokio::test]
    async fn test_sync_flushes_in_batches() {
        let dir = tempdir().unwrap();
        let known = [("A000000001", "1"), ("A000000002", "2"), ("A000000003", "3"), ("A000000004", "4"), ("A000000005", "5")];
        let lookup = FakeLookup::new(&known);
        let mut catalog = ProductCatalog::new(ProductCache::open(dir.path().join("p.json")).unwrap(), lookup, settings(2));

        let index = tags(&["asin:A000000001", "asin:A000000002", "asin:A000000003", "asin:A000000004", "asin:A000000005"]);
        let report = catalog.sync(&index).await.unwrap();

        assert_eq!(report.fetched, 5);
        assert_eq!(report.flushes, 3);
        assert!(!catalog.cache().is_dirty());
    }

    #[tokio::test]
    async fn test_sync_without_products_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("amazon.json");
        let mut catalog = ProductCatalog::new(ProductCache::open(&path).unwrap(), FakeLookup::new(&[]), settings(5));

        let report = catalog.sync(&tags(&["Ruby"])).await.unwrap();
        assert_eq!(report, CatalogReport::default());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_lookup_one() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("amazon.json");
        let lookup = FakeLookup::new(&[("B000000000", "Thing")]);
        let mut catalog = ProductCatalog::new(ProductCache::open(&path).unwrap(), lookup, settings(5));

        let record = catalog.lookup_one("B000000000", false, false).await.unwrap();
        assert_eq!(record["title"], "Thing");
        assert!(!path.exists());

        catalog.lookup_one("B000000000", false, true).await.unwrap();
        assert!(ProductCache::open(&path).unwrap().contains("B000000000"));

        catalog.lookup_one("B000000000", false, false).await.unwrap();
        assert_eq!(catalog.lookup.calls().len(), 2);

        catalog.lookup_one("B000000000", true, false).await.unwrap();
        assert_eq!(catalog.lookup.calls().len(), 3);

        assert!(catalog.lookup_one("nothing", false, true).await.unwrap().is_empty());
    }

    #[test]
    fn test_render_book() {
        let mut r = ProductRecord::new();
        r.insert("asin".into(), "4000000000".into());
        r.insert("ean".into(), "9784000000000".into());
        r.insert("product_group".into(), "Book".into());
        r.insert("title".into(), "Programming\u{3000}Rust 2nd".into());

        let out = render_product(&r);
        assert!(out.starts_with("asin: 4000000000\nean: 9784000000000\n"));
        assert!(out.contains("\n[isbn:9784000000000]\n><a name=\"ProgrammingRust2nd\">\n</a><\n#ProgrammingRust2nd\n"));
        assert!(out.ends_with("\n[asin:4000000000]\nhttp://www.amazon.co.jp/dp/4000000000\n"));
    }

    #[test]
    fn test_render_other() {
        let mut r = ProductRecord::new();
        r.insert("product_group".into(), "DVD".into());
        r.insert("author".into(), " nested\n  value".into());

        let out = render_product(&r);
        assert_eq!(out, "author: nested\n  value\nproduct_group: DVD\n");
    }
}
