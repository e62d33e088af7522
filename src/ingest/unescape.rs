//! Entity unescaping for raw export lines.
//!
//! Only `&amp;`, `&gt;`, `&lt;` and `&quot;` are expanded; any other entity
//! is left exactly as written.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(\w+);").expect("static regex"))
}

fn expand(name: &str) -> Option<&'static str> {
    match name {
        "amp" => Some("&"),
        "gt" => Some(">"),
        "lt" => Some("<"),
        "quot" => Some("\""),
        _ => None,
    }
}

pub fn unescape(line: &str) -> Cow<'_, str> {
    entity_regex().replace_all(line, |caps: &Captures<'_>| {
        match expand(&caps[1]) {
            Some(literal) => literal.to_string(),
            None => caps[0].to_string(),
        }
    })
}
