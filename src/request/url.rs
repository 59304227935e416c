//! # URL Decomposition
//!
//! Splits a URL into positional path segments and query parameters, and joins
//! them back together.
//!
//! ```text
//! https://example.com/api/v1?q=1&page=2
//! └─┬─┘   └────┬────┘ └┬┘ └┬┘ └────┬───┘
//! protocol   domain   "1" "2"   query
//! ```

use crate::error::{Result, SpiderError};
use indexmap::IndexMap;

/// Query parameters in insertion order
pub type QueryParams = IndexMap<String, String>;

pub const PROTOCOL_KEY: &str = "protocol";
pub const DOMAIN_KEY: &str = "domain";

/// Protocol assumed when the URL text carries no `://`
const DEFAULT_PROTOCOL: &str = "http";

/// Positional path segments of a URL.
///
/// Keys are `"protocol"`, `"domain"` and the numbered sub-path components
/// `"1"`, `"2"`, … which are joined with `/` in ascending numeric order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSegments {
    segments: IndexMap<String, String>,
}

impl PathSegments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the path part of a URL. Any query suffix must already be removed.
    pub fn parse(url: &str) -> Self {
        let (protocol, rest) = match url.split_once("://") {
            Some((protocol, rest)) => (protocol, rest),
            None => (DEFAULT_PROTOCOL, url),
        };

        let mut tokens = rest.split('/');
        let domain = tokens.next().unwrap_or_default();

        let mut segments = IndexMap::new();
        segments.insert(PROTOCOL_KEY.to_string(), protocol.to_string());
        segments.insert(DOMAIN_KEY.to_string(), domain.to_string());
        for (index, token) in tokens.filter(|t| !t.is_empty()).enumerate() {
            segments.insert((index + 1).to_string(), token.to_string());
        }

        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.segments.get(key).map(String::as_str)
    }

    pub fn domain(&self) -> Option<&str> {
        self.get(DOMAIN_KEY)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.segments.keys().map(String::as_str)
    }

    /// Set one segment, rejecting keys that cannot be positional
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.segments.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Numbered sub-path components sorted by their numeric key
    pub fn sub_path(&self) -> Vec<&str> {
        let mut numbered: Vec<(u32, &str)> = self
            .segments
            .iter()
            .filter_map(|(k, v)| k.parse::<u32>().ok().map(|n| (n, v.as_str())))
            .collect();
        numbered.sort_by_key(|(n, _)| *n);
        numbered.into_iter().map(|(_, v)| v).collect()
    }

    /// `{protocol}://{domain}/{sub/path}`
    pub fn to_url(&self) -> Result<String> {
        if self.segments.is_empty() {
            return Err(SpiderError::UrlNotSet);
        }
        let protocol = self.get(PROTOCOL_KEY).unwrap_or(DEFAULT_PROTOCOL);
        let domain = self.get(DOMAIN_KEY).unwrap_or_default();
        Ok(format!("{protocol}://{domain}/{}", self.sub_path().join("/")))
    }
}

/// A path key is `protocol`, `domain` or a positive integer written without leading zeros
pub fn validate_key(key: &str) -> Result<()> {
    let positional = key
        .parse::<u32>()
        .map(|n| n > 0 && n.to_string() == key)
        .unwrap_or(false);
    if key == PROTOCOL_KEY || key == DOMAIN_KEY || positional {
        Ok(())
    } else {
        Err(SpiderError::InvalidPathKey(key.to_string()))
    }
}

/// Split `url` into its path part and optional query string
pub fn split_query(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}

/// Parse `a=b&c=d`. A pair without `=` becomes a key with an empty value.
pub fn parse_query(raw: &str) -> QueryParams {
    raw.trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

/// Join pairs as `k=v` with `&`, without any prefix
pub fn join_pairs(pairs: &IndexMap<String, String>) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// `?k=v&...`, or an empty string when there are no parameters
pub fn query_string(params: &QueryParams) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("?{}", join_pairs(params))
    }
}
