//! Query Executor
//!
//! Answers questions about an analyzed diary:
//!
//! 1. **Tag lookup**: exact key, else every key with the query as prefix,
//!    else `isbn:<query>` / `asin:<query>`
//! 2. **Full-text search**: literal, case-sensitive substring over stored
//!    bodies, optionally scoped to a year or month
//! 3. **Article statistics**: per header tag, sums of entries, lines, bytes
//!    and characters

use crate::index::{bracket_contents, TagIndex};
use crate::query::error::{QueryError, QueryResult};
use crate::storage::{Article, ArticleRepository, ArticleScope, TagIndexStore};
use regex::Regex;
use std::sync::OnceLock;

/// Catalog schemes tried when a bare code matches nothing
const FALLBACK_SCHEMES: &[&str] = &["isbn", "asin"];

/// Stats bucket for articles whose header carries no tags
pub const NO_SECTION_TAG: &str = "(nonsection)";
/// Stats bucket counting every article
pub const TOTAL_TAG: &str = "(total)";

/// One tag and the articles recorded under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHit {
    pub tag: String,
    /// False only for an exact match, where the tag is what was asked
    pub show_tag: bool,
    pub timestamps: Vec<i64>,
}

/// Aggregates for one header tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagStat {
    pub tag: String,
    pub entries: usize,
    pub lines: usize,
    pub bytes: usize,
    pub chars: usize,
}

fn header_title_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\*[0-9]+\*\s*(.*)$").expect("static regex"))
}

pub struct QueryEngine<'a> {
    repo: &'a ArticleRepository,
    tags: TagIndex,
}

impl<'a> QueryEngine<'a> {
    pub fn new(repo: &'a ArticleRepository, tags: TagIndex) -> Self {
        Self { repo, tags }
    }

    /// Engine over the persisted tag index
    pub fn open(repo: &'a ArticleRepository, store: &TagIndexStore) -> QueryResult<Self> {
        Ok(Self::new(repo, store.load()?))
    }

    pub fn tags(&self) -> &TagIndex {
        &self.tags
    }

    /// Exact, then prefix, then catalog-scheme lookup
    pub fn find_tag(&self, query: &str) -> QueryResult<Vec<TagHit>> {
        if query.is_empty() {
            return Err(QueryError::EmptyTag);
        }

        if let Some(timestamps) = self.tags.get(query) {
            return Ok(vec![TagHit {
                tag: query.to_string(),
                show_tag: false,
                timestamps: timestamps.to_vec(),
            }]);
        }

        let hits: Vec<TagHit> = self
            .tags
            .prefixed(query)
            .map(|(tag, timestamps)| TagHit {
                tag: tag.to_string(),
                show_tag: true,
                timestamps: timestamps.to_vec(),
            })
            .collect();
        if !hits.is_empty() {
            return Ok(hits);
        }

        for scheme in FALLBACK_SCHEMES {
            let key = format!("{}:{}", scheme, query);
            if let Some(timestamps) = self.tags.get(&key) {
                return Ok(vec![TagHit {
                    tag: key,
                    show_tag: true,
                    timestamps: timestamps.to_vec(),
                }]);
            }
        }

        Ok(Vec::new())
    }

    /// Every tag in sorted order
    pub fn all_tags(&self) -> Vec<TagHit> {
        self.tags
            .iter()
            .map(|(tag, timestamps)| TagHit {
                tag: tag.to_string(),
                show_tag: true,
                timestamps: timestamps.to_vec(),
            })
            .collect()
    }

    /// Articles of a hit, oldest mention first
    pub fn resolve(&self, hit: &TagHit, with_body: bool) -> QueryResult<Vec<Article>> {
        hit.timestamps
            .iter()
            .map(|&ts| {
                let article = if with_body {
                    self.repo.load(ts)?
                } else {
                    self.repo.create(ts)?
                };
                Ok(article)
            })
            .collect()
    }

    /// Articles whose stored body contains `word`
    pub fn search(&self, word: &str, scope: Option<&str>) -> QueryResult<Vec<Article>> {
        if word.is_empty() {
            return Err(QueryError::EmptyWord);
        }

        let scope = match scope {
            None => ArticleScope::All,
            Some(s) => ArticleScope::parse(s).ok_or_else(|| QueryError::InvalidScope(s.to_string()))?,
        };

        let mut found = Vec::new();
        for path in self.repo.list(scope)? {
            let body = match std::fs::read(&path) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    tracing::debug!("Skipping unreadable {:?}: {}", path, e);
                    continue;
                }
            };
            if !body.contains(word) {
                continue;
            }

            let timestamp = match ArticleRepository::identify(&path.to_string_lossy()) {
                Ok(ts) => ts,
                Err(e) => {
                    tracing::warn!("{}", e);
                    continue;
                }
            };
            let mut article = self.repo.create(timestamp)?;
            article.location.path = path;
            article.body = body;
            found.push(article);
        }

        tracing::debug!("search {:?} matched {} articles", word, found.len());
        Ok(found)
    }

    /// Per-tag totals over every stored article, largest first
    pub fn article_stats(&self) -> QueryResult<Vec<TagStat>> {
        let mut stats: std::collections::HashMap<String, TagStat> = std::collections::HashMap::new();

        for path in self.repo.list(ArticleScope::All)? {
            let body = match std::fs::read(&path) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    tracing::debug!("Skipping unreadable {:?}: {}", path, e);
                    continue;
                }
            };

            let title = match header_title_regex().captures(&body).and_then(|c| c.get(1)) {
                Some(m) => m.as_str().trim_end_matches('\r'),
                None => continue,
            };

            let mut tags: Vec<String> = bracket_contents(title).into_iter().map(str::to_string).collect();
            if tags.is_empty() {
                tags.push(NO_SECTION_TAG.to_string());
            }
            tags.push(TOTAL_TAG.to_string());

            let lines = body.matches('\n').count();
            let bytes = body.len();
            let chars = body.chars().count();

            for tag in tags {
                let stat = stats.entry(tag.clone()).or_insert_with(|| TagStat {
                    tag,
                    ..TagStat::default()
                });
                stat.entries += 1;
                stat.lines += lines;
                stat.bytes += bytes;
                stat.chars += chars;
            }
        }

        let mut stats: Vec<TagStat> = stats.into_values().collect();
        stats.sort_by(|a, b| {
            b.entries
                .cmp(&a.entries)
                .then(b.bytes.cmp(&a.bytes))
                .then(a.tag.cmp(&b.tag))
        });
        Ok(stats)
    }
}
