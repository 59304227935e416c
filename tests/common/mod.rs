#![allow(dead_code)]

use bytes::Bytes;
use spiderline::request::headers::{insert_header, Headers};
use spiderline::{PreparedRequest, Response, Result, SpiderError, Transport, TransportOptions};

/// Answers every request with a description of it and remembers what it saw
#[derive(Default)]
pub struct EchoTransport {
    pub requests: Vec<PreparedRequest>,
    pub options_seen: Vec<TransportOptions>,
    pub set_cookies: Vec<String>,
    pub body: Option<String>,
    /// Number of leading calls that fail as if the connection was refused
    pub failures: usize,
}

impl EchoTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer with this body instead of the echo
    pub fn with_body(body: &str) -> Self {
        Self {
            body: Some(body.to_string()),
            ..Default::default()
        }
    }

    pub fn failing(failures: usize) -> Self {
        Self {
            failures,
            ..Default::default()
        }
    }

    /// Include these `Set-Cookie` values in every response
    pub fn with_set_cookies(cookies: &[&str]) -> Self {
        Self {
            set_cookies: cookies.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl Transport for EchoTransport {
    fn execute(&mut self, request: &PreparedRequest, options: &TransportOptions) -> Result<Response> {
        self.requests.push(request.clone());
        self.options_seen.push(options.clone());
        if self.failures > 0 {
            self.failures -= 1;
            return Err(SpiderError::TransportMessage("connection refused".to_string()));
        }

        let mut headers = Headers::new();
        for cookie in &self.set_cookies {
            insert_header(&mut headers, "Set-Cookie", cookie.clone());
        }
        let body = self.body.clone().unwrap_or_else(|| {
            format!(
                "{} {}\n{}",
                request.method,
                request.url,
                request.body.clone().unwrap_or_default()
            )
        });
        Ok(Response::new(200, request.url.clone(), headers, Bytes::from(body)))
    }
}
