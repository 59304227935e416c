//! # Spiderline - Mutable HTTP Requests for Crawling
//!
//! A [`Spider`] holds the decomposed state of one outbound request, lets it be
//! patched key by key, and pulls prepared requests through a transport when a
//! response is wanted.
//!
//! ## Architecture
//!
//! ```text
//!  update(..) ┌──────────────┐  prepare  ┌──────────────┐  send  ┌───────────┐
//! ───────────▶│ RequestModel │──────────▶│   Pipeline   │───────▶│ Transport │
//!   mutator   │ path/param/  │           │ pending ──┐  │◀───────│ (reqwest) │
//!             │ body/header/ │           │ received ◀┘  │        └───────────┘
//!             │ cookie       │           └──────┬───────┘
//!             └──────────────┘                  │ read_response
//!                                               ▼
//!                                         find(Rule) ─▶ Extractor
//! ```
//!
//! ```no_run
//! use spiderline::{Namespace, Rule, Spider, UpdateArgs};
//!
//! # fn main() -> spiderline::Result<()> {
//! let mut spider = Spider::new("https://example.com/search?q=rust")?;
//! let titles = spider.find(&Rule::css("h1"))?;
//!
//! spider.update(UpdateArgs::pair("q", "tokio"), Some(Namespace::Param), true)?;
//! let next = spider.find(&Rule::css("h1"))?;
//! # let _ = (titles, next);
//! # Ok(())
//! # }
//! ```

pub mod cmd_args;
pub mod config;
pub mod error;
pub mod extractor;
pub mod mutator;
pub mod pipeline;
pub mod request;
pub mod spider;
pub mod transport;

pub use error::{Result, SpiderError};
pub use extractor::Rule;
pub use mutator::{resolve_namespace, LookupTable, UpdateArgs};
pub use pipeline::{RequestPipeline, SendOutcome};
pub use request::{
    Body, CookieJar, HeaderValue, Headers, KeyLocationIndex, Method, Namespace, PostType,
    PreparedRequest, RequestModel,
};
pub use spider::{Spider, SpiderBuilder};
pub use transport::{ReqwestTransport, Response, Transport, TransportOptions};
