//! # Cookie Jar
//!
//! An owned name→value map. Re-setting an existing name either replaces the
//! value or is ignored, depending on the `overwrite` flag of the write.

use crate::error::{Result, SpiderError};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CookieJar {
    cookies: IndexMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `name1=value1; name2=value2`
    pub fn parse(raw: &str) -> Result<Self> {
        let mut jar = Self::new();
        for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| SpiderError::MalformedCookie(pair.to_string()))?;
            jar.set(name.trim(), value.trim(), true);
        }
        Ok(jar)
    }

    /// Collect the leading `name=value` of each `Set-Cookie` value.
    /// Values without a pair are skipped; they come from the server, not the caller.
    pub fn from_set_cookie<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut jar = Self::new();
        for value in values {
            let pair = value.split(';').next().unwrap_or_default().trim();
            match pair.split_once('=') {
                Some((name, value)) => {
                    jar.set(name.trim(), value.trim(), true);
                }
                None => {
                    tracing::warn!("Ignoring Set-Cookie without a name=value pair: {value}");
                }
            }
        }
        jar
    }

    /// Write one cookie. Returns false when an existing value was kept.
    pub fn set(&mut self, name: &str, value: &str, overwrite: bool) -> bool {
        if !overwrite && self.cookies.contains_key(name) {
            return false;
        }
        self.cookies.insert(name.to_string(), value.to_string());
        true
    }

    /// Fold every cookie of `other` into this jar
    pub fn merge(&mut self, other: &CookieJar, overwrite: bool) {
        for (name, value) in &other.cookies {
            self.set(name, value, overwrite);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.cookies.shift_remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cookies.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// `Cookie` header text: `a=1; b=2`
    pub fn to_header(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
