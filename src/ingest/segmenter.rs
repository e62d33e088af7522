//! Log Segmenter
//!
//! Splits the export stream into articles, line by line:
//!
//! ```text
//!            header                     header / end of stream
//!   Idle ───────────▶ Open(article) ─────────────────────────▶ finalize, then Open / Idle
//!    │                   │
//!    └ other: discard    └ other: append + extract tags
//! ```
//!
//! A header is `*<10+ digits>*<spaces><title>`. Finalizing strips the
//! closing `</body>` trailer and saves the article.

use crate::index::{TagExtractor, TagIndex};
use crate::ingest::export::{ExportRecord, ExportSinks};
use crate::ingest::source::read_line;
use crate::ingest::unescape::unescape;
use crate::storage::{Article, ArticleRepository, StorageResult};
use regex::Regex;
use std::io::{BufRead, Write};
use std::sync::OnceLock;

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*([0-9]{10,})\*\s*(.*)$").expect("static regex"))
}

fn tag_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:\[[^\]]*\])+").expect("static regex"))
}

/// A recognized header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'a> {
    pub timestamp: i64,
    /// Display title
    pub title: &'a str,
    /// Leading `[...]` run of the raw title
    pub tag_run: Option<&'a str>,
}

impl<'a> Header<'a> {
    /// Parse a line (terminator allowed). `None` for non-header lines and
    /// for headers whose digits do not fit a timestamp.
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        let caps = header_regex().captures(line)?;

        let digits = caps.get(1)?.as_str();
        let timestamp = match digits.parse::<i64>() {
            Ok(ts) => ts,
            Err(_) => {
                tracing::warn!("Header timestamp out of range: {}", digits);
                return None;
            }
        };

        let raw_title = caps.get(2)?.as_str();
        let (title, tag_run) = match tag_run_regex().find(raw_title) {
            Some(run) => (raw_title[run.end()..].trim(), Some(run.as_str())),
            None => (raw_title, None),
        };

        Some(Self {
            timestamp,
            title,
            tag_run,
        })
    }
}

enum Pending {
    Idle,
    Open(Article),
}

/// Counters for one segmentation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentStats {
    pub headers: usize,
    pub articles: usize,
    pub lines: usize,
    /// Lines seen before the first header
    pub discarded: usize,
}

/// Result of a completed pass
#[derive(Debug)]
pub struct SegmentOutcome {
    pub tags: TagIndex,
    pub stats: SegmentStats,
}

pub struct LogSegmenter<'a> {
    repo: &'a ArticleRepository,
    extractor: &'a TagExtractor,
    tags: TagIndex,
    pending: Pending,
    stats: SegmentStats,
}

impl<'a> LogSegmenter<'a> {
    pub fn new(repo: &'a ArticleRepository, extractor: &'a TagExtractor) -> Self {
        Self {
            repo,
            extractor,
            tags: TagIndex::new(),
            pending: Pending::Idle,
            stats: SegmentStats::default(),
        }
    }

    /// Consume the whole stream, then finalize
    pub fn run<W: Write>(
        mut self,
        reader: &mut dyn BufRead,
        sinks: &mut ExportSinks<W>,
    ) -> StorageResult<SegmentOutcome> {
        let mut buf = Vec::new();
        let mut line = String::new();
        while read_line(reader, &mut buf, &mut line)? {
            self.feed(&line, sinks)?;
        }
        self.finish()
    }

    /// Process one raw line (terminator included)
    pub fn feed<W: Write>(&mut self, raw: &str, sinks: &mut ExportSinks<W>) -> StorageResult<()> {
        self.stats.lines += 1;
        let line = unescape(raw);

        if let Some(header) = Header::parse(&line) {
            match self.repo.create(header.timestamp) {
                Ok(article) => return self.open(article, &line, &header, sinks),
                Err(e) => tracing::warn!("Skipping header: {}", e),
            }
        }

        match &mut self.pending {
            Pending::Open(article) => {
                article.push_line(&line);
                self.extractor.extract_into(&line, article.timestamp(), &mut self.tags);
            }
            Pending::Idle => self.stats.discarded += 1,
        }
        Ok(())
    }

    fn open<W: Write>(
        &mut self,
        mut article: Article,
        line: &str,
        header: &Header<'_>,
        sinks: &mut ExportSinks<W>,
    ) -> StorageResult<()> {
        self.finalize()?;
        self.stats.headers += 1;

        article.push_line(line);
        self.extractor.extract_into(line, article.timestamp(), &mut self.tags);

        tracing::debug!(
            timestamp = article.timestamp(),
            title = header.title,
            tags = header.tag_run.unwrap_or(""),
            "header"
        );

        sinks.emit(&ExportRecord {
            url: article.url(),
            title: header.title,
            date_label: article.date_label(),
            tag_run: header.tag_run,
        })?;

        self.pending = Pending::Open(article);
        Ok(())
    }

    /// Close the open article, if any
    fn finalize(&mut self) -> StorageResult<()> {
        if let Pending::Open(mut article) = std::mem::replace(&mut self.pending, Pending::Idle) {
            article.strip_trailer();
            self.repo.save(&article)?;
            self.stats.articles += 1;
        }
        Ok(())
    }

    /// End of stream
    pub fn finish(mut self) -> StorageResult<SegmentOutcome> {
        self.finalize()?;
        Ok(SegmentOutcome {
            tags: self.tags,
            stats: self.stats,
        })
    }
}
