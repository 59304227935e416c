//! # HTTP Transport
//!
//! The capability that actually performs a request. [`ReqwestTransport`] is the
//! real implementation over `reqwest::blocking`; tests substitute their own.

use crate::error::{Result, SpiderError};
use crate::request::headers::{insert_header, Headers};
use crate::request::{CookieJar, Method, PreparedRequest};
use bytes::Bytes;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Per-send options handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    pub timeout: Option<Duration>,
    pub follow_redirects: bool,
    pub max_redirects: usize,
    pub proxy: Option<String>,
    /// Verify TLS certificates. Applies to this transport only.
    pub verify: bool,
    /// PEM file holding the client certificate and its key
    pub client_cert: Option<PathBuf>,
    pub stream: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            proxy: None,
            verify: true,
            client_cert: None,
            stream: false,
        }
    }
}

/// A received response
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    status: u16,
    url: String,
    headers: Headers,
    cookies: CookieJar,
    #[serde(skip)]
    body: Bytes,
    elapsed: Duration,
}

impl Response {
    pub fn new(status: u16, url: impl Into<String>, headers: Headers, body: Bytes) -> Self {
        let cookies = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("set-cookie"))
            .map(|(_, v)| CookieJar::from_set_cookie(v.values()))
            .unwrap_or_default();
        Self {
            status,
            url: url.into(),
            headers,
            cookies,
            body,
            elapsed: Duration::ZERO,
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Final URL after redirects
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// First value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.first())
    }

    /// Cookies set by this response
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    /// Body decoded with the charset named in `Content-Type`, UTF-8 otherwise
    pub fn text(&self) -> String {
        let encoding = self
            .header("content-type")
            .and_then(|ct| {
                ct.split(';')
                    .filter_map(|part| part.trim().strip_prefix("charset="))
                    .next()
            })
            .and_then(|label| encoding_rs::Encoding::for_label(label.trim_matches('"').as_bytes()))
            .unwrap_or(encoding_rs::UTF_8);
        let (text, _, _) = encoding.decode(&self.body);
        text.into_owned()
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Performs one prepared request
pub trait Transport {
    fn execute(&mut self, request: &PreparedRequest, options: &TransportOptions) -> Result<Response>;
}

/// Blocking transport backed by reqwest.
///
/// The client is rebuilt only when the options change between sends.
#[derive(Default)]
pub struct ReqwestTransport {
    client: Option<(TransportOptions, Client)>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn client_for(&mut self, options: &TransportOptions) -> Result<Client> {
        if let Some((cached, client)) = &self.client {
            if cached == options {
                return Ok(client.clone());
            }
        }

        tracing::debug!("Building HTTP client: {:?}", options);
        let redirect = if options.follow_redirects {
            Policy::limited(options.max_redirects)
        } else {
            Policy::none()
        };
        let mut builder = Client::builder()
            .redirect(redirect)
            .danger_accept_invalid_certs(!options.verify);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy) = &options.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }
        if let Some(path) = &options.client_cert {
            let pem = std::fs::read(path).map_err(|e| {
                SpiderError::TransportMessage(format!(
                    "cannot read client certificate {}: {e}",
                    path.display()
                ))
            })?;
            builder = builder.identity(reqwest::Identity::from_pem(&pem)?);
        }

        let client = builder.build()?;
        self.client = Some((options.clone(), client.clone()));
        Ok(client)
    }
}

impl Transport for ReqwestTransport {
    fn execute(&mut self, request: &PreparedRequest, options: &TransportOptions) -> Result<Response> {
        let client = self.client_for(options)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = client.request(method, &request.url);
        for (key, value) in request.header_pairs() {
            builder = builder.header(key, value);
        }
        if !request.cookies.is_empty() {
            builder = builder.header(reqwest::header::COOKIE, request.cookies.to_header());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let start_time = Instant::now();
        let response = builder.send()?;
        let status = response.status().as_u16();
        let url = response.url().to_string();

        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            insert_header(
                &mut headers,
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
        if options.stream {
            tracing::debug!("Streaming requested; blocking transport buffers the body");
        }
        let body = response.bytes()?;
        let elapsed = start_time.elapsed();

        tracing::info!(
            "{} {} -> {} ({} bytes, {}ms)",
            request.method,
            request.url,
            status,
            body.len(),
            elapsed.as_millis()
        );

        Ok(Response::new(status, url, headers, body).with_elapsed(elapsed))
    }
}
