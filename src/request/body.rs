//! # Request Body
//!
//! A body is either form fields (`a=1&b=2`) or a JSON payload. The kind is
//! detected once from the raw text and decides how the body is serialized.

use crate::error::{Result, SpiderError};
use crate::request::url::{join_pairs, parse_query};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Form,
    Payload,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::Payload => "payload",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Form => "application/x-www-form-urlencoded",
            Self::Payload => "application/json",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Form(IndexMap<String, String>),
    Payload(Value),
}

impl Body {
    /// Detect and parse body text. Empty text means no body.
    ///
    /// Text that opens like JSON, or has `:` but no `=`, is a payload;
    /// anything with `=` is form fields.
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let looks_like_json = raw.starts_with('{') || raw.starts_with('[');
        if looks_like_json || (raw.contains(':') && !raw.contains('=')) {
            let value: Value = serde_json::from_str(raw)?;
            return Ok(Some(Self::Payload(value)));
        }

        if raw.contains('=') {
            return Ok(Some(Self::Form(parse_query(raw))));
        }

        Err(SpiderError::MalformedBody(format!(
            "'{raw}' is neither form fields nor a JSON payload"
        )))
    }

    pub fn post_type(&self) -> PostType {
        match self {
            Self::Form(_) => PostType::Form,
            Self::Payload(_) => PostType::Payload,
        }
    }

    /// Top-level field names
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Self::Form(fields) => fields.keys().map(String::as_str).collect(),
            Self::Payload(Value::Object(map)) => map.keys().map(String::as_str).collect(),
            Self::Payload(_) => Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match self {
            Self::Form(fields) => fields.get(key).cloned(),
            Self::Payload(Value::Object(map)) => map.get(key).map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            Self::Payload(_) => None,
        }
    }

    /// Set one top-level field. A payload must be a JSON object to take fields.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match self {
            Self::Form(fields) => {
                fields.insert(key.to_string(), value.to_string());
                Ok(())
            }
            Self::Payload(Value::Object(map)) => {
                map.insert(key.to_string(), Value::String(value.to_string()));
                Ok(())
            }
            Self::Payload(_) => Err(SpiderError::MalformedBody(format!(
                "cannot set field '{key}' on a payload that is not a JSON object"
            ))),
        }
    }

    pub fn serialize(&self) -> String {
        match self {
            Self::Form(fields) => join_pairs(fields),
            Self::Payload(value) => value.to_string(),
        }
    }
}
