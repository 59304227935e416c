//! # Request Pipeline
//!
//! Two FIFO queues: prepared requests waiting to be sent and responses waiting
//! to be read. Reading with no buffered response pulls exactly one pending
//! request through the transport.
//!
//! ```text
//!  enqueue ──▶ [ pending ] ──send──▶ Transport ──▶ [ received ] ──▶ read_response
//!                                 ▲                                  │
//!                                 └────────── empty read ────────────┘
//! ```
//!
//! The pipeline is single-threaded: one send completes before the next starts
//! and there is no retry. A request whose send fails is dropped and the error
//! is returned to the caller.

use crate::error::Result;
use crate::request::PreparedRequest;
use crate::transport::{Response, Transport, TransportOptions};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    NothingToSend,
}

pub struct RequestPipeline<T: Transport> {
    transport: T,
    options: TransportOptions,
    pending: VecDeque<PreparedRequest>,
    received: VecDeque<Response>,
    download_count: u64,
}

impl<T: Transport> RequestPipeline<T> {
    pub fn new(transport: T, options: TransportOptions) -> Self {
        Self {
            transport,
            options,
            pending: VecDeque::new(),
            received: VecDeque::new(),
            download_count: 0,
        }
    }

    pub fn enqueue(&mut self, request: PreparedRequest) {
        tracing::debug!("Enqueued {} {}", request.method, request.url);
        self.pending.push_back(request);
    }

    /// Send the oldest pending request with the pipeline's own options
    pub fn send(&mut self) -> Result<SendOutcome> {
        let options = self.options.clone();
        self.send_with(&options)
    }

    /// Send the oldest pending request. Nothing pending is a no-op, not an error.
    pub fn send_with(&mut self, options: &TransportOptions) -> Result<SendOutcome> {
        let Some(request) = self.pending.pop_front() else {
            tracing::debug!("Nothing to send");
            return Ok(SendOutcome::NothingToSend);
        };

        let response = self.transport.execute(&request, options)?;
        self.received.push_back(response);
        self.download_count += 1;
        tracing::debug!(
            "Download #{} complete, {} pending",
            self.download_count,
            self.pending.len()
        );
        Ok(SendOutcome::Sent)
    }

    /// Oldest received response, sending one pending request first if none is buffered
    pub fn read_response(&mut self) -> Result<Option<Response>> {
        if self.received.is_empty() {
            self.send()?;
        }
        Ok(self.received.pop_front())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn received_len(&self) -> usize {
        self.received.len()
    }

    pub fn download_count(&self) -> u64 {
        self.download_count
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: TransportOptions) {
        self.options = options;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
