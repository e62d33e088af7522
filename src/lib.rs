//! # hatedma
//!
//! Hatena Diary Manager - split a Hatena Diary export into one file per
//! article, index the bracketed tags of every line, and answer questions
//! about the result.
//!
//! ## Features
//!
//! - **Segmentation**: `*<timestamp>*` headers open articles, stored under `YYYY/MM/DD_<ts>.txt`
//! - **Tag index**: URLs, catalog codes and Hatena ids canonicalized into one sorted index
//! - **Link lists**: title, date and wiki-style lists of every article
//! - **Queries**: exact / prefix tag lookup, full-text search, per-tag statistics
//! - **Products**: cache-first lookup of `isbn:` / `asin:` tags
//!
//! ## Modules
//!
//! - [`config`]: TOML configuration and the derived on-disk layout
//! - [`storage`]: article files, keyed JSON stores and backup rotation
//! - [`index`]: tag extraction and the tag index
//! - [`ingest`]: the analyze pass over an export stream
//! - [`query`]: tag lookup, search and statistics
//! - [`integrations`]: product lookups
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hatedma::{ArticleRepository, Config, Ingestor, Layout, QueryEngine, TagIndexStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let layout = Layout::new(&config);
//!     layout.ensure_dirs()?;
//!
//!     let repo = ArticleRepository::new(
//!         &layout.diary_dir,
//!         &config.diary.username,
//!         &config.diary.url_base,
//!         config.utc_offset()?,
//!     );
//!
//!     let report = Ingestor::new(&layout, &repo).run()?;
//!     println!("{}", report);
//!
//!     let engine = QueryEngine::open(&repo, &TagIndexStore::new(&layout.tag_file))?;
//!     for hit in engine.find_tag("Ruby")? {
//!         println!("{}: {} articles", hit.tag, hit.timestamps.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod index;
pub mod ingest;
pub mod integrations;
pub mod query;
pub mod storage;

// Re-export top-level types for convenience
pub use config::{Config, ConfigError, Layout};

pub use storage::{
    Article, ArticleRepository, ArticleScope, ProductCache, ProductRecord, StorageError,
    StorageResult, TagIndexStore,
};

pub use index::{TagExtractor, TagIndex};

pub use ingest::{IngestReport, Ingestor};

pub use query::{OutputMode, QueryEngine, QueryError, TagHit, TagStat};

pub use integrations::{
    render_product, CatalogReport, CatalogSettings, HttpProductLookup, IntegrationError,
    ProductCatalog, ProductLookup,
};
