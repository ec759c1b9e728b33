//! The pooled blocking backend.
//!
//! A shared blocking engine executes wire calls on a fixed pool of worker
//! threads. Submitted requests carry their whole job into the pool, wire
//! call construction included, so every failure past `submit` surfaces when
//! the handle resolves rather than on the submitting thread.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use courier_core::{Error, Method, Request, Response, Result};

use crate::call;
use crate::engine::{BlockingEngine, ReqwestEngine};
use crate::handle::ResponseHandle;
use crate::pool::WorkerPool;
use crate::service::RequestService;
use crate::transform;

/// Tuning knobs for [`PooledRequestService`].
#[derive(Debug, Clone)]
pub struct PooledServiceConfig {
    /// Worker threads executing submitted requests.
    pub workers: usize,
    /// Idle connections the engine keeps alive per host.
    pub max_idle_connections_per_host: usize,
    /// Overall per-call timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for PooledServiceConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_idle_connections_per_host: 8,
            timeout: None,
        }
    }
}

struct PooledInner {
    engine: Arc<dyn BlockingEngine>,
    pool: WorkerPool,
}

/// Blocking backend over a pooled wire engine.
///
/// Supports every verb except CONNECT. The response locale is read from the
/// `Content-Language` header when the response declares one.
pub struct PooledRequestService {
    config: PooledServiceConfig,
    inner: RwLock<Option<PooledInner>>,
}

impl PooledRequestService {
    /// Create the service; [`init`](Self::init) must run before use.
    pub fn new(config: PooledServiceConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(None),
        }
    }

    /// Build the engine and start the worker pool. Idempotent.
    pub fn init(&self) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.is_some() {
            return Ok(());
        }

        let engine = ReqwestEngine::new(
            self.config.max_idle_connections_per_host,
            self.config.timeout,
        )?;
        *inner = Some(PooledInner {
            engine: Arc::new(engine),
            pool: WorkerPool::new(self.config.workers),
        });

        log::debug!(
            "Initialized pooled request service with {} workers",
            self.config.workers
        );
        Ok(())
    }

    /// A pre-initialized service over the given engine.
    #[cfg(test)]
    pub(crate) fn with_engine(
        config: PooledServiceConfig,
        engine: Arc<dyn BlockingEngine>,
    ) -> Self {
        let pool = WorkerPool::new(config.workers);
        Self {
            config,
            inner: RwLock::new(Some(PooledInner { engine, pool })),
        }
    }

    /// Stop the workers and release the engine.
    ///
    /// Requests already queued still finish; operations after shutdown
    /// report `NotInitialized`.
    pub fn shutdown(&self) {
        let inner = self.inner.write().unwrap().take();
        if let Some(mut inner) = inner {
            inner.pool.shutdown();
            log::debug!("Shut down pooled request service");
        }
    }
}

impl Drop for PooledRequestService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl RequestService for PooledRequestService {
    fn execute(&self, request: Request) -> Result<Response> {
        self.submit(request)?.wait()
    }

    fn submit(&self, request: Request) -> Result<ResponseHandle> {
        let guard = self.inner.read().unwrap();
        let inner = guard.as_ref().ok_or(Error::NotInitialized)?;

        let request = Arc::new(request);
        let (handle, resolver) = ResponseHandle::new();
        let engine = Arc::clone(&inner.engine);

        log::debug!("Submitting {request} to the worker pool");

        inner.pool.submit(move || match run(engine.as_ref(), &request) {
            Ok(response) => resolver.complete(response),
            Err(err) => {
                log::error!("Error executing {request}: {err}");
                resolver.fail(err);
            }
        });

        Ok(handle)
    }
}

/// One request's whole job: build the wire call, execute it, and reduce the
/// raw output. Runs on a worker thread.
fn run(engine: &dyn BlockingEngine, request: &Arc<Request>) -> Result<Response> {
    let call = build_call(request)?;
    let raw = engine.execute(call)?;
    let locale = transform::content_language(&raw);
    Ok(transform::response_from_raw(Arc::clone(request), raw, locale))
}

fn build_call(request: &Request) -> Result<reqwest::blocking::Request> {
    if request.method() == Method::CONNECT {
        return Err(Error::UnsupportedMethod {
            backend: "pooled",
            method: Method::CONNECT,
        });
    }

    let parts = call::wire_parts(request)?;
    let mut call = reqwest::blocking::Request::new(request.method().into(), parts.url);
    *call.headers_mut() = parts.headers;
    *call.body_mut() = parts.body.map(Into::into);
    Ok(call)
}
