//! # courier
//!
//! Transport-agnostic HTTP request execution.
//!
//! Describe a request declaratively, hand it to a backend, and get back a
//! normalized response no matter which engine did the wire work. Two
//! backends ship with the crate: [`PooledRequestService`] drives a blocking
//! engine from a worker pool, and [`AsyncRequestService`] drives a natively
//! asynchronous engine that settles handles through completion callbacks.
//!
//! ```ignore
//! use courier::{PooledRequestService, PooledServiceConfig, Request, RequestService};
//!
//! let service = PooledRequestService::new(PooledServiceConfig::default());
//! service.init()?;
//!
//! let response = service.execute(
//!     Request::get("http://example.com/data")
//!         .with_parameter("page", "2")
//!         .build()?,
//! )?;
//! assert!(response.is_success());
//! ```

pub mod engine;
pub mod handle;
pub mod nonblocking;
pub mod pooled;
pub mod service;

mod call;
mod pool;
mod transform;

// Re-export main types
pub use courier_core::{
    Cookie, Error, Method, Multimap, Request, RequestBuilder, Response, ResponseBuilder, Result,
};
pub use engine::{
    AsyncEngine, BlockingEngine, Completion, RawResponse, ReqwestAsyncEngine, ReqwestEngine,
};
pub use handle::{RequestState, ResponseHandle};
pub use nonblocking::{AsyncRequestService, AsyncServiceConfig};
pub use pooled::{PooledRequestService, PooledServiceConfig};
pub use service::RequestService;
