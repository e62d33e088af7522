//! Tag Extractor
//!
//! Finds every `[...]` run in a line (non-greedy, no nesting) and turns its
//! content into a canonical tag. Content is classified by an ordered list of
//! scheme rules; the first rule whose predicate accepts the content decides
//! how it is canonicalized:
//!
//! | Scheme        | Recognized by                     | Canonical form            |
//! |---------------|-----------------------------------|---------------------------|
//! | web address   | `http:` / `https:`                | first 2 `:` segments      |
//! | catalog code  | `isbn:` / `asin:` / `google:` (any case) | first 2 segments   |
//! | federated id  | `f:id:`                           | first 4 segments          |
//! | plain id      | `id:`                             | all segments, minus a trailing `image`/`detail` when more than 3 |
//! | keyword       | anything else                     | unchanged                 |

use crate::index::TagIndex;
use regex::Regex;
use std::sync::OnceLock;

/// Suffixes dropped from long plain identifiers
const ID_QUALIFIERS: &[&str] = &["image", "detail"];

/// Prefixes of the catalog-code family, matched case-insensitively
pub const CATALOG_PREFIXES: &[&str] = &["isbn:", "asin:", "google:"];

/// Classification family of a bracketed tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    WebAddress,
    CatalogCode,
    FederatedId,
    PlainId,
    Keyword,
}

/// One entry of the scheme table
pub struct SchemeRule {
    pub scheme: Scheme,
    pub matches: fn(&str) -> bool,
    pub canonicalize: fn(&str) -> String,
}

impl std::fmt::Debug for SchemeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemeRule").field("scheme", &self.scheme).finish()
    }
}

fn bracket_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(.*?)\]").expect("static regex"))
}

/// Split on ':' dropping trailing empty segments
fn segments(s: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = s.split(':').collect();
    while parts.last().map(|p| p.is_empty()).unwrap_or(false) {
        parts.pop();
    }
    parts
}

fn first_segments(s: &str, n: usize) -> String {
    let parts = segments(s);
    parts[..parts.len().min(n)].join(":")
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn is_web_address(s: &str) -> bool {
    s.starts_with("http:") || s.starts_with("https:")
}

fn is_catalog_code(s: &str) -> bool {
    CATALOG_PREFIXES.iter().any(|p| starts_with_ignore_case(s, p))
}

fn is_federated_id(s: &str) -> bool {
    s.starts_with("f:id:")
}

fn is_plain_id(s: &str) -> bool {
    s.starts_with("id:")
}

fn any(_: &str) -> bool {
    true
}

fn two_segments(s: &str) -> String {
    first_segments(s, 2)
}

fn four_segments(s: &str) -> String {
    first_segments(s, 4)
}

fn plain_id(s: &str) -> String {
    let mut parts = segments(s);
    if parts.len() > 3 && parts.last().map(|p| ID_QUALIFIERS.contains(p)).unwrap_or(false) {
        parts.pop();
    }
    parts.join(":")
}

fn unchanged(s: &str) -> String {
    s.to_string()
}

/// Scheme table in priority order
pub fn default_rules() -> Vec<SchemeRule> {
    vec![
        SchemeRule {
            scheme: Scheme::WebAddress,
            matches: is_web_address,
            canonicalize: two_segments,
        },
        SchemeRule {
            scheme: Scheme::CatalogCode,
            matches: is_catalog_code,
            canonicalize: two_segments,
        },
        SchemeRule {
            scheme: Scheme::FederatedId,
            matches: is_federated_id,
            canonicalize: four_segments,
        },
        SchemeRule {
            scheme: Scheme::PlainId,
            matches: is_plain_id,
            canonicalize: plain_id,
        },
        SchemeRule {
            scheme: Scheme::Keyword,
            matches: any,
            canonicalize: unchanged,
        },
    ]
}

/// Bracket scanner backed by a scheme table
#[derive(Debug)]
pub struct TagExtractor {
    rules: Vec<SchemeRule>,
}

impl Default for TagExtractor {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl TagExtractor {
    pub fn new(rules: Vec<SchemeRule>) -> Self {
        Self { rules }
    }

    /// Classify bracket content (delimiters already stripped)
    pub fn classify(&self, inner: &str) -> Option<(Scheme, String)> {
        let rule = self.rules.iter().find(|rule| (rule.matches)(inner))?;
        let tag = (rule.canonicalize)(inner);
        if tag.is_empty() {
            None
        } else {
            Some((rule.scheme, tag))
        }
    }

    /// Canonical tag for bracket content, `None` when it normalizes to empty
    pub fn canonicalize(&self, inner: &str) -> Option<String> {
        self.classify(inner).map(|(_, tag)| tag)
    }

    /// Canonical tags of every bracket run in `line`, in order of appearance
    pub fn extract(&self, line: &str) -> Vec<String> {
        bracket_regex()
            .captures_iter(line)
            .filter_map(|caps| caps.get(1))
            .filter_map(|inner| self.canonicalize(inner.as_str()))
            .collect()
    }

    /// Register every tag in `line` against `timestamp`
    pub fn extract_into(&self, line: &str, timestamp: i64, index: &mut TagIndex) -> usize {
        let mut found = 0;
        for tag in self.extract(line) {
            tracing::trace!("find tag: {}", tag);
            index.add(&tag, timestamp);
            found += 1;
        }
        found
    }
}

/// Bracket contents of `text` with delimiters stripped, no canonicalization
pub fn bracket_contents(text: &str) -> Vec<&str> {
    bracket_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(s: &str) -> Option<String> {
        TagExtractor::default().canonicalize(s)
    }

    #[test]
    fn test_keyword_unchanged() {
        assert_eq!(canon("Ruby").as_deref(), Some("Ruby"));
        assert_eq!(canon("日記").as_deref(), Some("日記"));
        assert_eq!(canon("a:b:c").as_deref(), Some("a:b:c"));
    }

    #[test]
    fn test_web_address() {
        assert_eq!(
            canon("http://example.com/path:title=Example").as_deref(),
            Some("http://example.com/path")
        );
        assert_eq!(canon("https://example.com").as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_catalog_code() {
        assert_eq!(canon("isbn:9784000000000").as_deref(), Some("isbn:9784000000000"));
        assert_eq!(canon("asin:B000000000:detail").as_deref(), Some("asin:B000000000"));
        assert_eq!(canon("ISBN:4000000000:image").as_deref(), Some("ISBN:4000000000"));
        assert_eq!(canon("google:search:more").as_deref(), Some("google:search"));
    }

    #[test]
    fn test_federated_id() {
        assert_eq!(
            canon("f:id:alice:20120113123456j:image").as_deref(),
            Some("f:id:alice:20120113123456j")
        );
    }

    #[test]
    fn test_plain_id() {
        assert_eq!(canon("id:alice:keyword:image").as_deref(), Some("id:alice:keyword"));
        assert_eq!(canon("id:alice:20120113:detail").as_deref(), Some("id:alice:20120113"));
        assert_eq!(canon("id:alice:image").as_deref(), Some("id:alice:image"));
        assert_eq!(canon("id:alice:a:b:c").as_deref(), Some("id:alice:a:b:c"));
        assert_eq!(canon("id:alice:").as_deref(), Some("id:alice"));
    }

    #[test]
    fn test_empty_discarded() {
        assert_eq!(canon(""), None);
        assert!(TagExtractor::default().extract("[] and []").is_empty());
        assert_eq!(canon("http:").as_deref(), Some("http"));
    }

    #[test]
    fn test_classify_scheme() {
        let ex = TagExtractor::default();
        assert_eq!(ex.classify("isbn:1").unwrap().0, Scheme::CatalogCode);
        assert_eq!(ex.classify("f:id:a:b").unwrap().0, Scheme::FederatedId);
        assert_eq!(ex.classify("id:a").unwrap().0, Scheme::PlainId);
        assert_eq!(ex.classify("https://x").unwrap().0, Scheme::WebAddress);
        assert_eq!(ex.classify("x").unwrap().0, Scheme::Keyword);
    }

    #[test]
    fn test_extract_header_line() {
        let ex = TagExtractor::default();
        let tags = ex.extract("*1326401059* [hatedma][Ruby] はてなダイアリーマネジャー");
        assert_eq!(tags, vec!["hatedma", "Ruby"]);
    }

    #[test]
    fn test_extract_non_nesting() {
        let ex = TagExtractor::default();
        assert_eq!(ex.extract("[a[b]c]"), vec!["a[b"]);
        assert_eq!(ex.extract("no brackets"), Vec::<String>::new());
    }

    #[test]
    fn test_extract_into_collapses() {
        let ex = TagExtractor::default();
        let mut index = TagIndex::new();

        ex.extract_into("[Ruby] and [Ruby]", 100, &mut index);
        ex.extract_into("more [Ruby]", 100, &mut index);
        assert_eq!(index.get("Ruby"), Some(&[100][..]));
    }

    #[test]
    fn test_custom_rule_order() {
        fn upper(s: &str) -> String {
            s.to_uppercase()
        }
        let mut rules = vec![SchemeRule {
            scheme: Scheme::Keyword,
            matches: |s| s.starts_with("x-"),
            canonicalize: upper,
        }];
        rules.extend(default_rules());

        let ex = TagExtractor::new(rules);
        assert_eq!(ex.canonicalize("x-tag").as_deref(), Some("X-TAG"));
        assert_eq!(ex.canonicalize("tag").as_deref(), Some("tag"));
    }

    #[test]
    fn test_bracket_contents() {
        assert_eq!(bracket_contents("[a] b [c]"), vec!["a", "c"]);
    }
}
