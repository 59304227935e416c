//! # Errors
//!
//! Every failure a Spider can report. Benign empty conditions (nothing pending,
//! no response available) are not errors and are returned as `None` instead.

use crate::request::Namespace;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SpiderError>;

#[derive(Debug, Error)]
pub enum SpiderError {
    /// The URL was read before one was ever set
    #[error("no URL has been set on this request")]
    UrlNotSet,

    #[error("path key '{0}' is neither 'protocol', 'domain' nor a positive segment number")]
    InvalidPathKey(String),

    /// The key lives in more than one namespace and no tag was given
    #[error("key '{key}' is ambiguous between {namespaces:?}; pass an explicit tag")]
    AmbiguousKey {
        key: String,
        namespaces: Vec<Namespace>,
    },

    #[error("paired update needs equal lengths, got {keys} keys and {values} values")]
    PairedLengthMismatch { keys: usize, values: usize },

    #[error("lookup table has no entry for '{0}'")]
    MissingLookupKey(String),

    #[error("malformed header line '{0}': missing ':' separator")]
    MalformedHeader(String),

    #[error("malformed cookie '{0}': missing '=' separator")]
    MalformedCookie(String),

    #[error("malformed body: {0}")]
    MalformedBody(String),

    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("transport error: {0}")]
    TransportMessage(String),

    /// Nothing was pending, so there is no response to work on
    #[error("no response available")]
    NoResponse,

    #[error("response body is empty")]
    EmptyResponseBody,

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("configuration error: {0}")]
    Config(String),
}
