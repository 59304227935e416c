//! # Header Parsing
//!
//! Header text is `Key: Value` lines. A key repeated on input is coalesced into
//! a [`HeaderValue::Multiple`] keeping the order the values appeared in.

use crate::error::{Result, SpiderError};
use indexmap::IndexMap;
use serde::Serialize;

/// Browser-like user agent used when no header text is supplied
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const HOST: &str = "Host";
pub const COOKIE: &str = "Cookie";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const USER_AGENT: &str = "User-Agent";

/// Header map in insertion order
pub type Headers = IndexMap<String, HeaderValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// Append another occurrence, promoting a single value to a list
    pub fn push(&mut self, value: String) {
        match self {
            Self::Single(first) => {
                let first = std::mem::take(first);
                *self = Self::Multiple(vec![first, value]);
            }
            Self::Multiple(values) => values.push(value),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value.as_str()],
            Self::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// First occurrence
    pub fn first(&self) -> &str {
        match self {
            Self::Single(value) => value,
            Self::Multiple(values) => values.first().map(String::as_str).unwrap_or_default(),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

/// Parse newline separated `Key: Value` text. Blank lines are skipped.
pub fn parse_headers(raw: &str) -> Result<Headers> {
    let mut headers = Headers::new();
    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| SpiderError::MalformedHeader(line.to_string()))?;
        insert_header(&mut headers, key.trim(), value.trim().to_string());
    }
    Ok(headers)
}

/// Add one occurrence of `key`, coalescing repeats under the first spelling seen
pub fn insert_header(headers: &mut Headers, key: &str, value: String) {
    let stored = find_key(headers, key).unwrap_or(key).to_string();
    match headers.get_mut(&stored) {
        Some(existing) => existing.push(value),
        None => {
            headers.insert(stored, HeaderValue::Single(value));
        }
    }
}

/// Case-insensitive lookup of the stored key
pub fn find_key<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .keys()
        .find(|k| k.eq_ignore_ascii_case(name))
        .map(String::as_str)
}

/// Back to `Key: Value` text, one line per value
pub fn header_lines(headers: &Headers) -> String {
    headers
        .iter()
        .flat_map(|(k, v)| v.values().into_iter().map(move |v| format!("{k}: {v}")))
        .collect::<Vec<_>>()
        .join("\n")
}
