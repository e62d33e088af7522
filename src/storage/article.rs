//! Article repository
//!
//! Every article is identified by its timestamp alone. The on-disk path, the
//! public URL and the date label are all pure functions of that timestamp
//! (plus the configured user name and UTC offset):
//!
//! ```text
//! 1326401059 → <root>/2012/01/13_1326401059.txt
//!            → http://d.hatena.ne.jp/<user>/20120113/1326401059
//!            → 2012年1月13日
//! ```

use crate::storage::error::{StorageError, StorageResult};
use chrono::{DateTime, Datelike, FixedOffset, TimeZone};
use std::path::{Path, PathBuf};

/// Marker that closes the diary body in an export; it and everything after
/// it are dropped when an article is finalized.
const CLOSING_MARKER: &str = "</body>";

const ARTICLE_EXT: &str = "txt";

/// Derived identity of an article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLocation {
    /// Seconds since the epoch
    pub timestamp: i64,
    pub path: PathBuf,
    pub url: String,
    pub date_label: String,
}

/// One diary entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub location: ArticleLocation,
    pub body: String,
}

impl Article {
    pub fn new(location: ArticleLocation) -> Self {
        Self {
            location,
            body: String::new(),
        }
    }

    pub fn timestamp(&self) -> i64 {
        self.location.timestamp
    }

    pub fn url(&self) -> &str {
        &self.location.url
    }

    pub fn path(&self) -> &Path {
        &self.location.path
    }

    pub fn date_label(&self) -> &str {
        &self.location.date_label
    }

    /// Append a line (terminator included) to the body
    pub fn push_line(&mut self, line: &str) {
        self.body.push_str(line);
    }

    /// Drop the closing marker and everything after it
    pub fn strip_trailer(&mut self) {
        if let Some(pos) = self.body.find(CLOSING_MARKER) {
            self.body.truncate(pos);
        }
    }
}

/// Directory subset of stored articles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleScope {
    All,
    Year(i32),
    Month(i32, u32),
}

impl ArticleScope {
    /// Parse "YYYY", "YYYYMM" or "YYYY/MM"
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let all_digits = |t: &str| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit());

        let (year, month) = match s.len() {
            4 if all_digits(s) => return s.parse().ok().map(ArticleScope::Year),
            6 if all_digits(s) => (&s[..4], &s[4..]),
            7 if s.as_bytes()[4] == b'/' => (&s[..4], &s[5..]),
            _ => return None,
        };
        if !all_digits(year) || !all_digits(month) {
            return None;
        }

        Some(ArticleScope::Month(year.parse().ok()?, month.parse().ok()?))
    }
}

/// Maps timestamps to stored article bodies
#[derive(Debug, Clone)]
pub struct ArticleRepository {
    root: PathBuf,
    username: String,
    url_base: String,
    offset: FixedOffset,
}

impl ArticleRepository {
    pub fn new(
        root: impl Into<PathBuf>,
        username: impl Into<String>,
        url_base: impl Into<String>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            root: root.into(),
            username: username.into(),
            url_base: url_base.into(),
            offset,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn datetime(&self, timestamp: i64) -> StorageResult<DateTime<FixedOffset>> {
        self.offset
            .timestamp_opt(timestamp, 0)
            .single()
            .ok_or(StorageError::InvalidTimestamp(timestamp))
    }

    /// Compute path, URL and date label without touching the disk
    pub fn locate(&self, timestamp: i64) -> StorageResult<ArticleLocation> {
        let dt = self.datetime(timestamp)?;

        let path = self
            .root
            .join(dt.format("%Y").to_string())
            .join(dt.format("%m").to_string())
            .join(format!("{}_{}.{}", dt.format("%d"), timestamp, ARTICLE_EXT));

        let url = format!(
            "{}/{}/{}/{}",
            self.url_base.trim_end_matches('/'),
            self.username,
            dt.format("%Y%m%d"),
            timestamp
        );

        let date_label = format!("{}年{}月{}日", dt.year(), dt.month(), dt.day());

        Ok(ArticleLocation {
            timestamp,
            path,
            url,
            date_label,
        })
    }

    /// Empty article for a timestamp
    pub fn create(&self, timestamp: i64) -> StorageResult<Article> {
        Ok(Article::new(self.locate(timestamp)?))
    }

    /// Read a stored article.
    ///
    /// A missing or unreadable file yields an empty body.
    pub fn load(&self, timestamp: i64) -> StorageResult<Article> {
        let mut article = self.create(timestamp)?;
        match std::fs::read(article.path()) {
            Ok(bytes) => article.body = String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                tracing::debug!("Article {} not readable: {}", timestamp, e);
            }
        }
        Ok(article)
    }

    /// Write the body, replacing any previous contents
    pub fn save(&self, article: &Article) -> StorageResult<()> {
        if let Some(parent) = article.path().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(article.path(), article.body.as_bytes())?;
        tracing::debug!("saved: {:?}", article.path());
        Ok(())
    }

    /// Stored article files under a scope, sorted by path
    pub fn list(&self, scope: ArticleScope) -> StorageResult<Vec<PathBuf>> {
        let month_dirs = match scope {
            ArticleScope::All => {
                let mut dirs = Vec::new();
                for year_dir in subdirs(&self.root)? {
                    dirs.extend(subdirs(&year_dir)?);
                }
                dirs
            }
            ArticleScope::Year(year) => subdirs(&self.root.join(format!("{:04}", year)))?,
            ArticleScope::Month(year, month) => {
                vec![self.root.join(format!("{:04}", year)).join(format!("{:02}", month))]
            }
        };

        let mut files = Vec::new();
        for dir in month_dirs {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            for entry in entries {
                let path = entry?.path();
                if path.is_file() && path.extension().map(|e| e == ARTICLE_EXT).unwrap_or(false) {
                    files.push(path);
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Extract the timestamp from a bare number, an article URL or a file name
    pub fn identify(text: &str) -> StorageResult<i64> {
        let text = text.trim();
        let unknown = || StorageError::UnknownArticle(text.to_string());
        let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

        let digits = if is_digits(text) {
            text
        } else if text.starts_with("http") {
            text.rsplit('/').next().filter(|s| is_digits(*s)).ok_or_else(unknown)?
        } else if let Some(stem) = text.strip_suffix(".txt") {
            let start = stem
                .rfind(|c: char| !c.is_ascii_digit())
                .map(|i| i + 1)
                .unwrap_or(0);
            Some(&stem[start..]).filter(|s| is_digits(*s)).ok_or_else(unknown)?
        } else {
            return Err(unknown());
        };

        digits.parse().map_err(|_| unknown())
    }
}

fn subdirs(dir: &Path) -> StorageResult<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}
