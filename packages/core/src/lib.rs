//! # courier-core
//!
//! Engine-independent building blocks for Courier: the request/response value
//! model, the parameter encoding pipeline, cookie extraction, and the shared
//! error type.
//!
//! A [`Request`] describes an HTTP call declaratively:
//!
//! ```ignore
//! use courier_core::{Method, Request};
//!
//! let request = Request::builder("https://example.com/search", Method::GET)
//!     .with_parameter("q", "rust")
//!     .with_header("Accept", "text/html")
//!     .build()?;
//! ```
//!
//! Backends consume the request through the [`encode`] pipeline (query string
//! or form body depending on the method), execute it on their engine, and
//! assemble a normalized [`Response`] whose cookies come from the shared
//! extractor in [`cookie`].

pub mod cookie;
pub mod encode;
pub mod error;
pub mod method;
pub mod request;
pub mod response;

// Re-export main types
pub use cookie::{Cookie, InvalidCookie};
pub use error::{Error, Result};
pub use method::Method;
pub use request::{Multimap, Request, RequestBuilder};
pub use response::{Response, ResponseBuilder};
