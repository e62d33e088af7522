//! Tag Index - Inverted index from canonical tag to article timestamps
//!
//! Maps "tag" → Vec<timestamp> in the order the mentions were seen.
//!
//! # Example
//! ```ignore
//! index.add("Ruby", 1326401059);
//! index.add("Ruby", 1326401059); // collapsed
//! index.add("Ruby", 1326500000);
//! assert_eq!(index.get("Ruby"), Some(&[1326401059, 1326500000][..]));
//! ```
//!
//! # Design Notes
//! - Sorted keys so prefix scans and serialized output are deterministic
//! - A timestamp is appended only if it differs from the last one recorded
//!   for that tag; a tag can list the same article twice when another
//!   article's mention lies between them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagIndex {
    entries: BTreeMap<String, Vec<i64>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mention of `tag` by the article at `timestamp`.
    ///
    /// Empty tags are ignored. Returns whether the list grew.
    pub fn add(&mut self, tag: &str, timestamp: i64) -> bool {
        if tag.is_empty() {
            return false;
        }

        match self.entries.get_mut(tag) {
            Some(list) => {
                if list.last() == Some(&timestamp) {
                    false
                } else {
                    list.push(timestamp);
                    true
                }
            }
            None => {
                self.entries.insert(tag.to_string(), vec![timestamp]);
                true
            }
        }
    }

    /// Timestamps recorded for an exact tag
    pub fn get(&self, tag: &str) -> Option<&[i64]> {
        self.entries.get(tag).map(Vec::as_slice)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Tags starting with `prefix`, in sorted order
    pub fn prefixed<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a [i64])> + 'a {
        self.entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(tag, _)| tag.starts_with(prefix))
            .map(|(tag, list)| (tag.as_str(), list.as_slice()))
    }

    /// All tags in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[i64])> {
        self.entries.iter().map(|(tag, list)| (tag.as_str(), list.as_slice()))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of distinct tags
    pub fn tag_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of recorded mentions
    pub fn mention_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut index = TagIndex::new();

        assert!(index.add("Ruby", 100));
        assert!(index.add("Ruby", 200));
        assert!(index.add("Rust", 200));

        assert_eq!(index.get("Ruby"), Some(&[100, 200][..]));
        assert_eq!(index.get("Rust"), Some(&[200][..]));
        assert_eq!(index.get("Go"), None);
        assert_eq!(index.tag_count(), 2);
        assert_eq!(index.mention_count(), 3);
    }

    #[test]
    fn test_adjacent_duplicates_collapse() {
        let mut index = TagIndex::new();

        index.add("Ruby", 100);
        assert!(!index.add("Ruby", 100));
        assert_eq!(index.get("Ruby"), Some(&[100][..]));
    }

    #[test]
    fn test_non_adjacent_duplicates_kept() {
        let mut index = TagIndex::new();

        index.add("Ruby", 100);
        index.add("Ruby", 200);
        index.add("Ruby", 100);
        assert_eq!(index.get("Ruby"), Some(&[100, 200, 100][..]));
    }

    #[test]
    fn test_empty_tag_ignored() {
        let mut index = TagIndex::new();
        assert!(!index.add("", 100));
        assert!(index.is_empty());
    }

    #[test]
    fn test_prefixed_sorted() {
        let mut index = TagIndex::new();
        index.add("isbn:9784", 1);
        index.add("Ruby", 2);
        index.add("isbn:4001", 3);
        index.add("is", 4);
        index.add("id:alice", 5);

        let tags: Vec<&str> = index.prefixed("isbn").map(|(t, _)| t).collect();
        assert_eq!(tags, vec!["isbn:4001", "isbn:9784"]);

        let tags: Vec<&str> = index.prefixed("i").map(|(t, _)| t).collect();
        assert_eq!(tags, vec!["id:alice", "is", "isbn:4001", "isbn:9784"]);
        assert!(tags.iter().all(|t| t.starts_with('i')));

        assert_eq!(index.prefixed("zzz").count(), 0);
    }

    #[test]
    fn test_serialized_shape() {
        let mut index = TagIndex::new();
        index.add("b", 2);
        index.add("a", 1);

        let json = serde_json::to_string(&index).unwrap();
        assert_eq!(json, r#"{"a":[1],"b":[2]}"#);

        let back: TagIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, index);
    }
}
