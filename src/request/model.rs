//! # Request Model
//!
//! The decomposed state of one outbound request: path segments, query
//! parameters, body fields, headers and cookies. Each part can be replaced
//! from text, patched one key at a time, and serialized back into a
//! [`PreparedRequest`].

use crate::error::{Result, SpiderError};
use crate::request::body::{Body, PostType};
use crate::request::cookies::CookieJar;
use crate::request::headers::{
    self, find_key, header_lines, parse_headers, HeaderValue, Headers, CONTENT_TYPE, COOKIE, HOST,
};
use crate::request::url::{self, parse_query, query_string, split_query, PathSegments, QueryParams};
use serde::Serialize;
use std::fmt;

/// The five places a key can live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Path,
    Param,
    Body,
    Header,
    Cookie,
}

impl Namespace {
    pub const ALL: [Namespace; 5] = [
        Namespace::Path,
        Namespace::Param,
        Namespace::Body,
        Namespace::Header,
        Namespace::Cookie,
    ];
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Path => "path",
            Self::Param => "param",
            Self::Body => "body",
            Self::Header => "header",
            Self::Cookie => "cookie",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live keys of every namespace at one moment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyLocationIndex {
    pub path: Vec<String>,
    pub param: Vec<String>,
    pub body: Vec<String>,
    pub header: Vec<String>,
    pub cookie: Vec<String>,
}

impl KeyLocationIndex {
    pub fn keys(&self, namespace: Namespace) -> &[String] {
        match namespace {
            Namespace::Path => &self.path,
            Namespace::Param => &self.param,
            Namespace::Body => &self.body,
            Namespace::Header => &self.header,
            Namespace::Cookie => &self.cookie,
        }
    }

    /// Every namespace currently holding `key`. Header names match case-insensitively.
    pub fn locate(&self, key: &str) -> Vec<Namespace> {
        Namespace::ALL
            .into_iter()
            .filter(|ns| {
                self.keys(*ns).iter().any(|k| match ns {
                    Namespace::Header => k.eq_ignore_ascii_case(key),
                    _ => k == key,
                })
            })
            .collect()
    }
}

/// Immutable, fully serialized snapshot ready for a transport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<String>,
    pub headers: Headers,
    pub cookies: CookieJar,
}

impl PreparedRequest {
    /// Header pairs flattened, one per value
    pub fn header_pairs(&self) -> Vec<(&str, &str)> {
        self.headers
            .iter()
            .flat_map(|(k, v)| v.values().into_iter().map(move |v| (k.as_str(), v)))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct RequestModel {
    method: Method,
    path: PathSegments,
    params: QueryParams,
    body: Option<Body>,
    headers: Headers,
    cookies: CookieJar,
    overwrite_cookies: bool,
    /// `Host` mirrors the domain and follows URL changes
    host_bound: bool,
}

impl RequestModel {
    /// Build a model from the raw construction strings.
    ///
    /// The body is parsed first: the method is POST exactly when a body is
    /// present, and a present body suppresses query parameters from the URL.
    pub fn from_parts(
        url: Option<&str>,
        body: Option<&str>,
        header: Option<&str>,
        cookie: Option<&str>,
        overwrite_cookies: bool,
    ) -> Result<Self> {
        let body = match body {
            Some(raw) => Body::parse(raw)?,
            None => None,
        };
        let method = if body.is_some() {
            Method::Post
        } else {
            Method::Get
        };

        let mut model = Self {
            method,
            path: PathSegments::new(),
            params: QueryParams::new(),
            body,
            headers: Headers::new(),
            cookies: CookieJar::new(),
            overwrite_cookies,
            host_bound: false,
        };

        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            model.set_url(url);
        }
        let header = header
            .filter(|h| !h.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}: {}", headers::USER_AGENT, headers::DEFAULT_USER_AGENT));
        model.set_headers(&header)?;
        if let Some(cookie) = cookie {
            model.set_cookies(cookie)?;
        }

        Ok(model)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn overwrite_cookies(&self) -> bool {
        self.overwrite_cookies
    }

    pub fn set_overwrite_cookies(&mut self, overwrite: bool) {
        self.overwrite_cookies = overwrite;
    }

    /// Replace path segments and query parameters from `url`.
    /// Blank text clears the URL.
    pub fn set_url(&mut self, url: &str) {
        if url.trim().is_empty() {
            self.path = PathSegments::new();
            self.params.clear();
            tracing::debug!("URL cleared");
            return;
        }
        let (path, query) = split_query(url.trim());
        self.path = PathSegments::parse(path);
        self.set_params(query.unwrap_or_default());
        tracing::debug!(
            "URL set: domain={:?}, segments={}, params={}",
            self.path.domain(),
            self.path.sub_path().len(),
            self.params.len()
        );
        self.sync_host();
    }

    /// `{protocol}://{domain}/{sub/path}` without the query string
    pub fn get_url(&self) -> Result<String> {
        self.path.to_url()
    }

    /// URL including the query string
    pub fn get_full_url(&self) -> Result<String> {
        Ok(format!("{}{}", self.get_url()?, self.get_param_string()))
    }

    pub fn path(&self) -> &PathSegments {
        &self.path
    }

    /// Replace query parameters. Ignored, leaving none, while a body is present.
    pub fn set_params(&mut self, raw: &str) {
        if self.body.is_some() {
            if !raw.is_empty() {
                tracing::debug!("Body present, dropping query parameters '{raw}'");
            }
            self.params.clear();
            return;
        }
        self.params = parse_query(raw);
    }

    pub fn get_params(&self) -> &QueryParams {
        &self.params
    }

    /// `?k=v&...` or an empty string
    pub fn get_param_string(&self) -> String {
        query_string(&self.params)
    }

    /// Replace the body. Empty text removes it.
    pub fn set_body(&mut self, raw: &str) -> Result<()> {
        self.body = Body::parse(raw)?;
        Ok(())
    }

    /// Serialized body, empty when there is none
    pub fn get_body(&self) -> String {
        self.body.as_ref().map(Body::serialize).unwrap_or_default()
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn post_type(&self) -> Option<PostType> {
        self.body.as_ref().map(Body::post_type)
    }

    /// Replace headers from `Key: Value` text.
    ///
    /// A `Cookie` line is moved into the cookie jar rather than kept as a header.
    pub fn set_headers(&mut self, raw: &str) -> Result<()> {
        let mut parsed = parse_headers(raw)?;
        if let Some(key) = find_key(&parsed, COOKIE).map(str::to_string) {
            if let Some(value) = parsed.shift_remove(&key) {
                for line in value.values() {
                    self.set_cookies(line)?;
                }
            }
        }
        self.headers = parsed;
        self.host_bound = self.host_matches_domain();
        Ok(())
    }

    pub fn get_headers(&self) -> &Headers {
        &self.headers
    }

    /// Headers back as `Key: Value` lines
    pub fn header_lines(&self) -> String {
        header_lines(&self.headers)
    }

    /// Merge `name=value; ...` text into the cookie jar
    pub fn set_cookies(&mut self, raw: &str) -> Result<()> {
        let parsed = CookieJar::parse(raw)?;
        self.cookies.merge(&parsed, self.overwrite_cookies);
        Ok(())
    }

    pub fn get_cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Fold cookies from another source, e.g. a response, into the jar
    pub fn merge_cookies(&mut self, other: &CookieJar) {
        self.cookies.merge(other, self.overwrite_cookies);
    }

    /// `Cookie` header text for the current jar
    pub fn cookie_header(&self) -> String {
        self.cookies.to_header()
    }

    pub fn key_location_index(&self) -> KeyLocationIndex {
        KeyLocationIndex {
            path: self.path.keys().map(str::to_string).collect(),
            param: self.params.keys().cloned().collect(),
            body: self
                .body
                .as_ref()
                .map(|b| b.keys().into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
            header: self.headers.keys().cloned().collect(),
            cookie: self.cookies.names().map(str::to_string).collect(),
        }
    }

    /// Set one key in one namespace.
    ///
    /// On the cookie namespace a key of `Cookie` carries `name=value; ...` text.
    /// A body write on a model without a body starts a form body.
    pub fn set_value(&mut self, namespace: Namespace, key: &str, value: &str) -> Result<()> {
        match namespace {
            Namespace::Path => {
                self.path.set(key, value)?;
                if key == url::DOMAIN_KEY {
                    self.sync_host();
                }
            }
            Namespace::Param => {
                self.params.insert(key.to_string(), value.to_string());
            }
            Namespace::Body => match &mut self.body {
                Some(body) => body.set(key, value)?,
                None => {
                    let mut body = Body::Form(Default::default());
                    body.set(key, value)?;
                    self.body = Some(body);
                }
            },
            Namespace::Header if key.eq_ignore_ascii_case(COOKIE) => {
                self.set_cookies(value)?;
            }
            Namespace::Header => {
                let stored = find_key(&self.headers, key)
                    .unwrap_or(key)
                    .to_string();
                self.headers
                    .insert(stored, HeaderValue::Single(value.to_string()));
                if key.eq_ignore_ascii_case(HOST) {
                    self.host_bound = self.path.domain() == Some(value);
                }
            }
            Namespace::Cookie => {
                if key.eq_ignore_ascii_case(COOKIE) {
                    self.set_cookies(value)?;
                } else {
                    self.cookies.set(key, value, self.overwrite_cookies);
                }
            }
        }
        Ok(())
    }

    /// Serialize the current state into a new prepared request
    pub fn prepare(&self) -> Result<PreparedRequest> {
        let url = self.get_full_url()?;
        let mut headers = self.headers.clone();
        if let Some(post_type) = self.post_type() {
            if find_key(&headers, CONTENT_TYPE).is_none() {
                headers.insert(
                    CONTENT_TYPE.to_string(),
                    HeaderValue::from(post_type.content_type()),
                );
            }
        }

        Ok(PreparedRequest {
            method: self.method,
            url,
            body: self.body.as_ref().map(Body::serialize),
            headers,
            cookies: self.cookies.clone(),
        })
    }

    fn host_matches_domain(&self) -> bool {
        match (find_key(&self.headers, HOST), self.path.domain()) {
            (Some(key), Some(domain)) => self
                .headers
                .get(key)
                .map(|v| v.first() == domain)
                .unwrap_or(false),
            _ => false,
        }
    }

    fn sync_host(&mut self) {
        if !self.host_bound {
            return;
        }
        let Some(domain) = self.path.domain().map(str::to_string) else {
            return;
        };
        if let Some(key) = find_key(&self.headers, HOST).map(str::to_string) {
            tracing::debug!("Host header follows URL: {domain}");
            self.headers.insert(key, HeaderValue::Single(domain));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_model(url: &str) -> RequestModel {
        RequestModel::from_parts(Some(url), None, None, None, true).unwrap()
    }

    #[test]
    fn model_without_body_should_be_get() {
        let model = get_model("https://example.com/api?q=1");

        assert_eq!(model.method(), Method::Get);
        assert_eq!(model.get_url().unwrap(), "https://example.com/api");
        assert_eq!(model.get_param_string(), "?q=1");
        assert_eq!(model.get_full_url().unwrap(), "https://example.com/api?q=1");
    }

    #[test]
    fn model_with_body_should_be_post_without_params() {
        let model = RequestModel::from_parts(
            Some("https://example.com/login?next=home"),
            Some("a=1&b=2"),
            None,
            None,
            true,
        )
        .unwrap();

        assert_eq!(model.method(), Method::Post);
        assert_eq!(model.post_type(), Some(PostType::Form));
        assert_eq!(model.get_body(), "a=1&b=2");
        assert!(model.get_params().is_empty());
        assert_eq!(model.get_param_string(), "");
    }

    #[test]
    fn model_should_default_user_agent() {
        let model = get_model("https://example.com");
        assert_eq!(
            model.get_headers().get(headers::USER_AGENT),
            Some(&HeaderValue::from(headers::DEFAULT_USER_AGENT))
        );
    }

    #[test]
    fn get_url_should_fail_before_url_is_set() {
        let model = RequestModel::from_parts(None, None, None, None, true).unwrap();
        assert!(matches!(model.get_url(), Err(SpiderError::UrlNotSet)));
        assert!(matches!(model.prepare(), Err(SpiderError::UrlNotSet)));
    }

    #[test]
    fn set_url_should_replace_path_and_params() {
        let mut model = get_model("https://example.com/a/b/c?x=1");
        model.set_url("http://other.org/z?y=2");

        assert_eq!(model.get_url().unwrap(), "http://other.org/z");
        assert!(model.get_params().get("x").is_none());
        assert_eq!(model.get_params().get("y").map(String::as_str), Some("2"));
        assert!(model.path().get("2").is_none());
    }

    #[test]
    fn cookie_header_line_should_move_into_jar() {
        let model = RequestModel::from_parts(
            Some("https://example.com"),
            None,
            Some("Accept: */*\nCookie: sid=1; lang=en"),
            None,
            true,
        )
        .unwrap();

        assert!(find_key(model.get_headers(), COOKIE).is_none());
        assert_eq!(model.get_cookies().get("sid"), Some("1"));
        assert_eq!(model.cookie_header(), "sid=1; lang=en");
    }

    #[test]
    fn set_cookies_should_honour_overwrite_flag() {
        let mut model =
            RequestModel::from_parts(Some("https://a.com"), None, None, Some("sid=1"), false)
                .unwrap();

        model.set_cookies("sid=2; extra=3").unwrap();

        assert_eq!(model.get_cookies().get("sid"), Some("1"));
        assert_eq!(model.get_cookies().get("extra"), Some("3"));
    }

    #[test]
    fn key_location_index_should_list_live_keys() {
        let model = RequestModel::from_parts(
            Some("https://example.com/api?q=1"),
            None,
            Some("Accept: */*"),
            Some("sid=1"),
            true,
        )
        .unwrap();

        let index = model.key_location_index();
        assert_eq!(index.path, vec!["protocol", "domain", "1"]);
        assert_eq!(index.param, vec!["q"]);
        assert!(index.body.is_empty());
        assert_eq!(index.header, vec!["Accept"]);
        assert_eq!(index.cookie, vec!["sid"]);
        assert_eq!(index.locate("accept"), vec![Namespace::Header]);
        assert!(index.locate("missing").is_empty());
    }

    #[test]
    fn host_header_should_follow_url_when_bound() {
        let mut model = RequestModel::from_parts(
            Some("https://example.com/"),
            None,
            Some("Host: example.com"),
            None,
            true,
        )
        .unwrap();

        model.set_url("https://mirror.example.net/x");

        assert_eq!(
            model.get_headers().get(HOST),
            Some(&HeaderValue::from("mirror.example.net"))
        );
    }

    #[test]
    fn host_header_should_stay_when_unbound() {
        let mut model = get_model("https://example.com/");
        model.set_value(Namespace::Header, "Host", "proxy.local").unwrap();

        model.set_url("https://other.com/");

        assert_eq!(
            model.get_headers().get(HOST),
            Some(&HeaderValue::from("proxy.local"))
        );
    }

    #[test]
    fn host_set_to_domain_should_bind() {
        let mut model = get_model("https://example.com/");
        model.set_value(Namespace::Header, "host", "example.com").unwrap();

        model.set_value(Namespace::Path, "domain", "new.example.com").unwrap();

        assert_eq!(
            model.get_headers().get("host"),
            Some(&HeaderValue::from("new.example.com"))
        );
    }

    #[test]
    fn prepare_should_add_content_type_for_body() {
        let model = RequestModel::from_parts(
            Some("https://example.com/api"),
            Some(r#"{"a": 1}"#),
            None,
            None,
            true,
        )
        .unwrap();

        let prepared = model.prepare().unwrap();
        assert_eq!(prepared.method, Method::Post);
        assert_eq!(prepared.url, "https://example.com/api");
        assert_eq!(prepared.body.as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(
            prepared.headers.get(CONTENT_TYPE),
            Some(&HeaderValue::from("application/json"))
        );
    }

    #[test]
    fn body_write_without_body_should_start_form() {
        let mut model = get_model("https://example.com/");
        model.set_value(Namespace::Body, "k", "v").unwrap();

        assert_eq!(model.post_type(), Some(PostType::Form));
        assert_eq!(model.get_body(), "k=v");
        assert_eq!(model.method(), Method::Get);
    }

    #[test]
    fn cookie_written_as_header_should_land_in_jar() {
        let mut model = RequestModel::from_parts(
            Some("https://example.com/"),
            None,
            None,
            Some("sid=1"),
            true,
        )
        .unwrap();

        model
            .set_value(Namespace::Header, "Cookie", "lang=en")
            .unwrap();
        let prepared = model.prepare().unwrap();

        assert!(find_key(&prepared.headers, COOKIE).is_none());
        assert_eq!(prepared.cookies.get("sid"), Some("1"));
        assert_eq!(prepared.cookies.get("lang"), Some("en"));
    }

    #[test]
    fn mixed_case_header_update_should_replace_every_repeat() {
        let mut model = RequestModel::from_parts(
            Some("https://example.com/"),
            None,
            Some("Accept: a\naccept: b"),
            None,
            true,
        )
        .unwrap();

        model.set_value(Namespace::Header, "ACCEPT", "c").unwrap();

        assert_eq!(model.header_lines(), "Accept: c");
    }

    #[test]
    fn blank_url_should_clear_path() {
        let mut model = get_model("https://example.com/api?q=1");

        model.set_url("  ");

        assert!(matches!(model.get_url(), Err(SpiderError::UrlNotSet)));
        assert_eq!(model.get_param_string(), "");
        assert!(model.prepare().is_err());
    }
}
