//! Tag Indexing
//!
//! - **TagExtractor**: scheme-aware canonicalization of `[...]` markup
//! - **TagIndex**: in-memory inverted index, tag → article timestamps
//!
//! # Architecture
//!
//! ```text
//! line: "*1326401059* [hatedma][Ruby] ..."
//!        ↓
//! TagExtractor: "hatedma", "Ruby"
//!        ↓
//! TagIndex: hatedma → [1326401059], Ruby → [.., 1326401059]
//! ```

mod extractor;
mod tag_index;

pub use extractor::{bracket_contents, default_rules, Scheme, SchemeRule, TagExtractor, CATALOG_PREFIXES};
pub use tag_index::TagIndex;
