//! Link-list exports
//!
//! Every header produces one CRLF-terminated line in each of three lists:
//!
//! ```text
//! title: [<url>:title=<title>]<!-- 2012年1月13日 [hatedma][Ruby] -->
//! date:  [<url>:title=2012年1月13日]<span class="deco" style="font-size:xx-small;">(<title>)</span><!-- [hatedma][Ruby] -->
//! wiki:  [[<title>><url>]]//<!-- 2012年1月13日 [hatedma][Ruby] -->
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// What the formatters need to know about one header
#[derive(Debug, Clone, Copy)]
pub struct ExportRecord<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub date_label: &'a str,
    /// Leading `[...]` run of the raw title, if any
    pub tag_run: Option<&'a str>,
}

impl ExportRecord<'_> {
    /// `<!-- <date>[ <tags>] -->`
    pub fn annotation(&self) -> String {
        match self.tag_run {
            Some(run) => format!("<!-- {} {} -->", self.date_label, run),
            None => format!("<!-- {} -->", self.date_label),
        }
    }

    /// `<!-- <tags> -->` or nothing
    pub fn tag_comment(&self) -> String {
        self.tag_run
            .map(|run| format!("<!-- {} -->", run))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Title,
    Date,
    Wiki,
}

impl ListKind {
    pub const ALL: [ListKind; 3] = [ListKind::Title, ListKind::Date, ListKind::Wiki];

    /// One list line, CRLF included
    pub fn format(&self, rec: &ExportRecord<'_>) -> String {
        match self {
            ListKind::Title => format!("[{}:title={}]{}\r\n", rec.url, rec.title, rec.annotation()),
            ListKind::Date => format!(
                "[{}:title={}]<span class=\"deco\" style=\"font-size:xx-small;\">({})</span>{}\r\n",
                rec.url,
                rec.date_label,
                rec.title,
                rec.tag_comment()
            ),
            ListKind::Wiki => format!("[[{}>{}]]//{}\r\n", rec.title, rec.url, rec.annotation()),
        }
    }
}

/// The three list outputs of one pass
pub struct ExportSinks<W: Write> {
    title: W,
    date: W,
    wiki: W,
    records: usize,
}

impl ExportSinks<BufWriter<File>> {
    /// Create (truncate) the three list files
    pub fn create(title: &Path, date: &Path, wiki: &Path) -> std::io::Result<Self> {
        let open = |p: &Path| File::create(p).map(BufWriter::new);
        Ok(Self::new(open(title)?, open(date)?, open(wiki)?))
    }
}

impl<W: Write> ExportSinks<W> {
    pub fn new(title: W, date: W, wiki: W) -> Self {
        Self {
            title,
            date,
            wiki,
            records: 0,
        }
    }

    pub fn emit(&mut self, rec: &ExportRecord<'_>) -> std::io::Result<()> {
        for kind in ListKind::ALL {
            let line = kind.format(rec);
            self.sink(kind).write_all(line.as_bytes())?;
        }
        self.records += 1;
        Ok(())
    }

    fn sink(&mut self, kind: ListKind) -> &mut W {
        match kind {
            ListKind::Title => &mut self.title,
            ListKind::Date => &mut self.date,
            ListKind::Wiki => &mut self.wiki,
        }
    }

    pub fn records(&self) -> usize {
        self.records
    }

    /// Flush and hand back the writers
    pub fn finish(mut self) -> std::io::Result<(W, W, W)> {
        self.title.flush()?;
        self.date.flush()?;
        self.wiki.flush()?;
        Ok((self.title, self.date, self.wiki))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://d.hatena.ne.jp/takehikom/20120113/1326401059";

    fn tagged() -> ExportRecord<'static> {
        ExportRecord {
            url: URL,
            title: "はてなダイアリーマネジャー",
            date_label: "2012年1月13日",
            tag_run: Some("[hatedma][Ruby]"),
        }
    }

    fn untagged() -> ExportRecord<'static> {
        ExportRecord {
            tag_run: None,
            ..tagged()
        }
    }

    #[test]
    fn test_title_list() {
        assert_eq!(
            ListKind::Title.format(&tagged()),
            format!("[{}:title=はてなダイアリーマネジャー]<!-- 2012年1月13日 [hatedma][Ruby] -->\r\n", URL)
        );
        assert_eq!(
            ListKind::Title.format(&untagged()),
            format!("[{}:title=はてなダイアリーマネジャー]<!-- 2012年1月13日 -->\r\n", URL)
        );
    }

    #[test]
    fn test_date_list() {
        assert_eq!(
            ListKind::Date.format(&tagged()),
            format!(
                "[{}:title=2012年1月13日]<span class=\"deco\" style=\"font-size:xx-small;\">(はてなダイアリーマネジャー)</span><!-- [hatedma][Ruby] -->\r\n",
                URL
            )
        );
        assert!(ListKind::Date.format(&untagged()).ends_with("</span>\r\n"));
    }

    #[test]
    fn test_wiki_list() {
        assert_eq!(
            ListKind::Wiki.format(&tagged()),
            format!("[[はてなダイアリーマネジャー>{}]]//<!-- 2012年1月13日 [hatedma][Ruby] -->\r\n", URL)
        );
    }

    #[test]
    fn test_sinks() {
        let mut sinks = ExportSinks::new(Vec::new(), Vec::new(), Vec::new());
        sinks.emit(&tagged()).unwrap();
        sinks.emit(&untagged()).unwrap();
        assert_eq!(sinks.records(), 2);

        let (title, date, wiki) = sinks.finish().unwrap();
        for out in [title, date, wiki] {
            let text = String::from_utf8(out).unwrap();
            assert_eq!(text.matches("\r\n").count(), 2);
        }
    }
}
