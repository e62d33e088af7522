//! Diary Storage
//!
//! This module persists everything an ingest pass produces:
//!
//! - **article**: per-entry files addressed by timestamp
//! - **tag_store**: the serialized tag index
//! - **product_cache**: cached catalog lookups
//! - **rotation**: current/backup generations of the above
//! - **keyed**: single-key JSON documents shared by the two stores
//! - **error**: Error types
//!
//! # Layout
//!
//! ```text
//! <base>/amazon.json
//! <base>/<user>/tag.json            tag.json.old
//! <base>/<user>/data/YYYY/MM/DD_<timestamp>.txt
//! <base>/<user>/data.old/...
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::FixedOffset;
//! use hatedma::storage::ArticleRepository;
//!
//! let offset = FixedOffset::east_opt(9 * 3600).unwrap();
//! let repo = ArticleRepository::new("./data", "alice", "http://d.hatena.ne.jp", offset);
//!
//! let article = repo.load(1326401059)?;
//! println!("{} {}", article.url(), article.body.len());
//! # Ok::<(), hatedma::storage::StorageError>(())
//! ```

pub mod article;
pub mod error;
pub mod keyed;
pub mod product_cache;
pub mod rotation;
pub mod tag_store;

// Re-export commonly used types
pub use article::{Article, ArticleLocation, ArticleRepository, ArticleScope};
pub use error::{StorageError, StorageResult};
pub use keyed::KeyedStore;
pub use product_cache::{ProductCache, ProductRecord};
pub use rotation::Generations;
pub use tag_store::TagIndexStore;
