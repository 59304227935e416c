//! # Spider
//!
//! One crawl target: its current request state, the requests prepared from it
//! and the most recent exchange.
//!
//! A Spider always prepares its initial request at construction, so there is
//! something to send before any explicit mutation.

use crate::error::{Result, SpiderError};
use crate::extractor::{extract, Rule};
use crate::mutator::{apply_update, UpdateArgs};
use crate::pipeline::{RequestPipeline, SendOutcome};
use crate::request::{Method, Namespace, PreparedRequest, RequestModel, DEFAULT_USER_AGENT};
use crate::transport::{ReqwestTransport, Response, Transport, TransportOptions};

/// Construction inputs for a [`Spider`]
#[derive(Debug, Clone)]
pub struct SpiderBuilder {
    url: String,
    body: Option<String>,
    header: Option<String>,
    cookie: Option<String>,
    overwrite: bool,
    user_agent: String,
    options: TransportOptions,
}

impl SpiderBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: None,
            header: None,
            cookie: None,
            overwrite: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            options: TransportOptions::default(),
        }
    }

    /// Form (`a=1&b=2`) or JSON text. A body makes the request a POST.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// `Key: Value` lines. Replaces the default `User-Agent` header.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// `name=value; ...`
    pub fn cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// Whether re-setting an existing cookie replaces it
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// User agent sent when no header text is given
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<Spider<ReqwestTransport>> {
        self.build_with_transport(ReqwestTransport::new())
    }

    pub fn build_with_transport<T: Transport>(self, transport: T) -> Result<Spider<T>> {
        let header = self
            .header
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| format!("User-Agent: {}", self.user_agent));
        let model = RequestModel::from_parts(
            Some(self.url.as_str()),
            self.body.as_deref(),
            Some(header.as_str()),
            self.cookie.as_deref(),
            self.overwrite,
        )?;

        let mut pipeline = RequestPipeline::new(transport, self.options);
        pipeline.enqueue(model.prepare()?);
        tracing::info!("Spider created: {} {}", model.method(), model.get_full_url()?);

        Ok(Spider {
            model,
            pipeline,
            current: None,
            last: None,
        })
    }
}

pub struct Spider<T: Transport = ReqwestTransport> {
    model: RequestModel,
    pipeline: RequestPipeline<T>,
    /// Response of the current step; cleared when a new request is prepared
    current: Option<Response>,
    last: Option<Response>,
}

impl Spider<ReqwestTransport> {
    /// GET spider for `url` with default headers and options
    pub fn new(url: impl Into<String>) -> Result<Self> {
        SpiderBuilder::new(url).build()
    }

    pub fn builder(url: impl Into<String>) -> SpiderBuilder {
        SpiderBuilder::new(url)
    }
}

impl<T: Transport> Spider<T> {
    pub fn model(&self) -> &RequestModel {
        &self.model
    }

    /// Direct access for wholesale setters. Call [`Spider::prepare`] afterwards to send the result.
    pub fn model_mut(&mut self) -> &mut RequestModel {
        &mut self.model
    }

    pub fn method(&self) -> Method {
        self.model.method()
    }

    pub fn get_url(&self) -> Result<String> {
        self.model.get_url()
    }

    pub fn get_param_string(&self) -> String {
        self.model.get_param_string()
    }

    pub fn get_body(&self) -> String {
        self.model.get_body()
    }

    /// Patch the request. With `prepare`, the new state is queued behind any
    /// requests already pending.
    pub fn update(&mut self, args: UpdateArgs<'_>, tag: Option<Namespace>, prepare: bool) -> Result<()> {
        apply_update(&mut self.model, args, tag)?;
        if prepare {
            self.prepare()?;
        }
        Ok(())
    }

    /// Snapshot the current state and queue it. Starts a new step.
    pub fn prepare(&mut self) -> Result<PreparedRequest> {
        let prepared = self.model.prepare()?;
        self.pipeline.enqueue(prepared.clone());
        self.current = None;
        Ok(prepared)
    }

    pub fn send(&mut self) -> Result<SendOutcome> {
        self.pipeline.send()
    }

    /// Oldest received response, pulling one request through if none is buffered
    pub fn read_response(&mut self) -> Result<Option<Response>> {
        let response = self.pipeline.read_response()?;
        if let Some(response) = &response {
            self.current = Some(response.clone());
            self.last = Some(response.clone());
        }
        Ok(response)
    }

    /// Response of the current step, fetched on first use
    pub fn response(&mut self) -> Result<Option<&Response>> {
        if self.current.is_none() {
            self.read_response()?;
        }
        Ok(self.current.as_ref())
    }

    /// Extract values from the current step's response body
    pub fn find(&mut self, rule: &Rule) -> Result<Vec<String>> {
        let response = self.response()?.ok_or(SpiderError::NoResponse)?;
        if response.body().is_empty() {
            tracing::warn!("Response from {} has an empty body", response.url());
            return Err(SpiderError::EmptyResponseBody);
        }
        extract(&response.text(), rule)
    }

    /// Most recent response read in any step
    pub fn last_response(&self) -> Option<&Response> {
        self.last.as_ref()
    }

    pub fn pending_len(&self) -> usize {
        self.pipeline.pending_len()
    }

    pub fn download_count(&self) -> u64 {
        self.pipeline.download_count()
    }

    pub fn options(&self) -> &TransportOptions {
        self.pipeline.options()
    }

    pub fn set_options(&mut self, options: TransportOptions) {
        self.pipeline.set_options(options);
    }

    pub fn transport(&self) -> &T {
        self.pipeline.transport()
    }
}
