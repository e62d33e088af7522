//! Export stream input
//!
//! The exported diary may be stored plain, gzip-compressed (`.gz`) or
//! LZ4-framed (`.lz4`); all three come back as a line reader.

use crate::storage::StorageResult;
use flate2::read::MultiGzDecoder;
use lz4_flex::frame::FrameDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Compression of an export file, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Lz4,
}

impl Compression {
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => Compression::Gzip,
            Some("lz4") => Compression::Lz4,
            _ => Compression::None,
        }
    }
}

/// Open an export file for line-by-line reading
pub fn open_export(path: &Path) -> StorageResult<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let compression = Compression::detect(path);
    tracing::debug!("Opening {:?} ({:?})", path, compression);

    Ok(match compression {
        Compression::None => Box::new(BufReader::new(file)),
        Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        Compression::Lz4 => Box::new(BufReader::new(FrameDecoder::new(file))),
    })
}

/// Read one line including its terminator, decoding invalid UTF-8 lossily.
///
/// Returns `Ok(false)` at end of stream.
pub fn read_line(reader: &mut dyn BufRead, buf: &mut Vec<u8>, line: &mut String) -> std::io::Result<bool> {
    buf.clear();
    line.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(false);
    }
    line.push_str(&String::from_utf8_lossy(buf));
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::tempdir;

    fn read_all(mut reader: Box<dyn BufRead>) -> Vec<String> {
        let mut buf = Vec::new();
        let mut line = String::new();
        let mut lines = Vec::new();
        while read_line(reader.as_mut(), &mut buf, &mut line).unwrap() {
            lines.push(line.clone());
        }
        lines
    }

    #[test]
    fn test_detect() {
        assert_eq!(Compression::detect(Path::new("a.xml.gz")), Compression::Gzip);
        assert_eq!(Compression::detect(Path::new("a.xml.lz4")), Compression::Lz4);
        assert_eq!(Compression::detect(Path::new("a.xml")), Compression::None);
        assert_eq!(Compression::detect(Path::new("alice")), Compression::None);
    }

    #[test]
    fn test_plain() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alice.xml");
        std::fs::write(&path, "one\ntwo").unwrap();

        assert_eq!(read_all(open_export(&path).unwrap()), vec!["one\n", "two"]);
    }

    #[test]
    fn test_gzip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alice.xml.gz");

        let mut enc = GzEncoder::new(File::create(&path).unwrap(), flate2::Compression::default());
        enc.write_all("*1326401059* 日記\nbody\n".as_bytes()).unwrap();
        enc.finish().unwrap();

        assert_eq!(
            read_all(open_export(&path).unwrap()),
            vec!["*1326401059* 日記\n", "body\n"]
        );
    }

    #[test]
    fn test_lz4() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alice.xml.lz4");

        let mut enc = lz4_flex::frame::FrameEncoder::new(File::create(&path).unwrap());
        enc.write_all(b"a\nb\n").unwrap();
        enc.finish().unwrap();

        assert_eq!(read_all(open_export(&path).unwrap()), vec!["a\n", "b\n"]);
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let reader: Box<dyn BufRead> = Box::new(&b"ok\xff\n"[..]);
        assert_eq!(read_all(reader), vec!["ok\u{fffd}\n"]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(open_export(&dir.path().join("nope")).is_err());
    }
}
