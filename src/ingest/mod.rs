//! Diary Ingestion
//!
//! One full pass re-derives everything from the export stream:
//!
//! ```text
//! rotate(data → data.old, tag.json → tag.json.old)
//!        ↓
//! export stream → unescape → LogSegmenter ─┬─▶ ArticleRepository (per article)
//!                                          ├─▶ title / date / wiki lists (per header)
//!                                          └─▶ TagIndex ─▶ TagIndexStore (once)
//! ```

pub mod export;
pub mod segmenter;
pub mod source;
pub mod unescape;

pub use export::{ExportRecord, ExportSinks, ListKind};
pub use segmenter::{Header, LogSegmenter, SegmentOutcome, SegmentStats};
pub use source::{open_export, Compression};
pub use unescape::unescape;

use crate::config::Layout;
use crate::index::TagExtractor;
use crate::storage::{ArticleRepository, Generations, StorageResult, TagIndexStore};
use std::path::PathBuf;

/// Summary of an analyze pass
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub export_file: PathBuf,
    pub stats: SegmentStats,
    pub tags: usize,
    pub mentions: usize,
}

impl std::fmt::Display for IngestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} articles, {} tags ({} mentions) from {:?}",
            self.stats.articles, self.tags, self.mentions, self.export_file
        )
    }
}

/// Runs full analyze passes over one user's layout
pub struct Ingestor<'a> {
    layout: &'a Layout,
    repo: &'a ArticleRepository,
    extractor: TagExtractor,
}

impl<'a> Ingestor<'a> {
    /// `repo` must be rooted at `layout.diary_dir`
    pub fn new(layout: &'a Layout, repo: &'a ArticleRepository) -> Self {
        Self {
            layout,
            repo,
            extractor: TagExtractor::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: TagExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn run(&self) -> StorageResult<IngestReport> {
        let layout = self.layout;
        tracing::info!("Diary file: {:?}", layout.export_file);
        let mut reader = open_export(&layout.export_file)?;

        Generations::new(&layout.diary_dir, &layout.diary_dir_old).rotate()?;
        Generations::new(&layout.tag_file, &layout.tag_file_old).rotate()?;

        let mut sinks = ExportSinks::create(&layout.list_title, &layout.list_date, &layout.list_wiki)?;
        let outcome = LogSegmenter::new(self.repo, &self.extractor).run(reader.as_mut(), &mut sinks)?;
        sinks.finish()?;

        TagIndexStore::new(&layout.tag_file).save(&outcome.tags)?;

        let report = IngestReport {
            export_file: layout.export_file.clone(),
            tags: outcome.tags.tag_count(),
            mentions: outcome.tags.mention_count(),
            stats: outcome.stats,
        };
        tracing::info!("Analyzed {}", report);
        Ok(report)
    }
}
