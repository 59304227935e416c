//! # Request Module
//!
//! The decomposed request state and its text codecs.

pub mod body;
pub mod cookies;
pub mod headers;
pub mod model;
pub mod url;

pub use body::{Body, PostType};
pub use cookies::CookieJar;
pub use headers::{HeaderValue, Headers, DEFAULT_USER_AGENT};
pub use model::{KeyLocationIndex, Method, Namespace, PreparedRequest, RequestModel};
pub use url::{PathSegments, QueryParams};
