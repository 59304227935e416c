//! # Extraction
//!
//! Pulls values out of a response body with CSS selectors or regular expressions.

use crate::error::{Result, SpiderError};
use regex::Regex;
use scraper::{Html, Selector};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Text of every matching element, whitespace collapsed
    Css(String),
    /// An attribute of every matching element that carries it
    CssAttr { selector: String, attr: String },
    /// The first capture group of every match, or the whole match without groups
    Regex(String),
}

impl Rule {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn attr(selector: impl Into<String>, attr: impl Into<String>) -> Self {
        Self::CssAttr {
            selector: selector.into(),
            attr: attr.into(),
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex(pattern.into())
    }
}

pub fn extract(body: &str, rule: &Rule) -> Result<Vec<String>> {
    match rule {
        Rule::Css(selector) => {
            let selector = parse_selector(selector)?;
            let doc = Html::parse_document(body);
            Ok(doc
                .select(&selector)
                .map(|el| normalize_text(&el.text().collect::<Vec<_>>().join(" ")))
                .filter(|text| !text.is_empty())
                .collect())
        }
        Rule::CssAttr { selector, attr } => {
            let selector = parse_selector(selector)?;
            let doc = Html::parse_document(body);
            Ok(doc
                .select(&selector)
                .filter_map(|el| el.value().attr(attr))
                .map(str::to_string)
                .collect())
        }
        Rule::Regex(pattern) => {
            let re = Regex::new(pattern).map_err(|e| SpiderError::Extraction(e.to_string()))?;
            Ok(re
                .captures_iter(body)
                .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
                .map(|m| m.as_str().to_string())
                .collect())
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| SpiderError::Extraction(format!("invalid selector '{selector}': {e:?}")))
}

fn normalize_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
