//! Diary Queries
//!
//! Read-only questions over an analyzed diary:
//!
//! - **Executor**: tag lookup, full-text search and per-tag statistics
//! - **Output**: how a matched article is rendered
//!
//! # Examples
//!
//! ```rust,ignore
//! use hatedma::query::{OutputMode, QueryEngine};
//!
//! let engine = QueryEngine::open(&repo, &TagIndexStore::new(&layout.tag_file))?;
//! for hit in engine.find_tag("Ruby")? {
//!     for article in engine.resolve(&hit, false)? {
//!         print!("{}", OutputMode::Url.render(&article));
//!     }
//! }
//! ```

mod error;
mod executor;

pub use error::{QueryError, QueryResult};
pub use executor::{QueryEngine, TagHit, TagStat, NO_SECTION_TAG, TOTAL_TAG};

use crate::storage::Article;

/// How matched articles are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Permalink
    #[default]
    Url,
    /// Stored file path
    File,
    /// Banner with the path, then the stored body
    Body,
}

impl OutputMode {
    pub fn needs_body(&self) -> bool {
        matches!(self, OutputMode::Body)
    }

    /// Text for one article, trailing newline included for `Url` and `File`
    pub fn render(&self, article: &Article) -> String {
        match self {
            OutputMode::Url => format!("{}\n", article.url()),
            OutputMode::File => format!("{}\n", article.path().display()),
            OutputMode::Body => format!("--\n-- {} --\n--\n{}", article.path().display(), article.body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ArticleRepository;
    use chrono::FixedOffset;

    fn article() -> Article {
        let repo = ArticleRepository::new("/data", "alice", "http://d.hatena.ne.jp", FixedOffset::east_opt(9 * 3600).unwrap());
        let mut article = repo.create(1326401059).unwrap();
        article.body = "*1326401059* t\nbody\n".to_string();
        article
    }

    #[test]
    fn test_render_modes() {
        let a = article();
        assert_eq!(OutputMode::Url.render(&a), "http://d.hatena.ne.jp/alice/20120113/1326401059\n");
        assert_eq!(OutputMode::File.render(&a), "/data/2012/01/13_1326401059.txt\n");
        assert_eq!(
            OutputMode::Body.render(&a),
            "--\n-- /data/2012/01/13_1326401059.txt --\n--\n*1326401059* t\nbody\n"
        );
        assert!(OutputMode::Body.needs_body());
        assert!(!OutputMode::default().needs_body());
    }
}
