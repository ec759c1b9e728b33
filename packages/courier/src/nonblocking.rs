//! The natively-asynchronous backend.
//!
//! Wire calls run on the engine's own runtime and settle their handles
//! through completion callbacks. Unlike the pooled backend, the wire call is
//! built before submission, so construction failures surface from `submit`
//! itself with their original kind.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use courier_core::{Error, Method, Request, Response, Result};

use crate::call;
use crate::engine::{AsyncEngine, ReqwestAsyncEngine};
use crate::handle::ResponseHandle;
use crate::service::RequestService;
use crate::transform;

/// Tuning knobs for [`AsyncRequestService`].
#[derive(Debug, Clone, Default)]
pub struct AsyncServiceConfig {
    /// Overall per-call timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

struct AsyncInner {
    engine: Arc<dyn AsyncEngine>,
}

/// Natively-async backend.
///
/// Supports every verb except TRACE. The response locale is never populated
/// by this backend.
pub struct AsyncRequestService {
    config: AsyncServiceConfig,
    inner: RwLock<Option<AsyncInner>>,
}

impl AsyncRequestService {
    /// Create the service; [`init`](Self::init) must run before use.
    pub fn new(config: AsyncServiceConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(None),
        }
    }

    /// Build the engine and its runtime. Idempotent.
    pub fn init(&self) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.is_some() {
            return Ok(());
        }

        let engine = ReqwestAsyncEngine::new(self.config.timeout)?;
        *inner = Some(AsyncInner {
            engine: Arc::new(engine),
        });

        log::debug!("Initialized async request service");
        Ok(())
    }

    /// A pre-initialized service over the given engine.
    #[cfg(test)]
    pub(crate) fn with_engine(config: AsyncServiceConfig, engine: Arc<dyn AsyncEngine>) -> Self {
        Self {
            config,
            inner: RwLock::new(Some(AsyncInner { engine })),
        }
    }

    /// Release the engine and its runtime.
    ///
    /// Calls still in flight are cancelled and their handles settle as
    /// failed; operations after shutdown report `NotInitialized`.
    pub fn shutdown(&self) {
        if self.inner.write().unwrap().take().is_some() {
            log::debug!("Shut down async request service");
        }
    }
}

impl Drop for AsyncRequestService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl RequestService for AsyncRequestService {
    fn execute(&self, request: Request) -> Result<Response> {
        self.submit(request)?.wait()
    }

    fn submit(&self, request: Request) -> Result<ResponseHandle> {
        let guard = self.inner.read().unwrap();
        let inner = guard.as_ref().ok_or(Error::NotInitialized)?;

        let request = Arc::new(request);
        let call = build_call(&request)?;
        let (handle, resolver) = ResponseHandle::new();

        log::debug!("Submitting {request} to the async engine");

        inner.engine.execute(
            call,
            Box::new(move |result| match result {
                Ok(raw) => {
                    resolver.complete(transform::response_from_raw(request, raw, None));
                }
                Err(err) => {
                    log::error!("Error executing {request}: {err}");
                    resolver.fail(err);
                }
            }),
        );

        Ok(handle)
    }
}

fn build_call(request: &Request) -> Result<reqwest::Request> {
    if request.method() == Method::TRACE {
        return Err(Error::UnsupportedMethod {
            backend: "async",
            method: Method::TRACE,
        });
    }

    let parts = call::wire_parts(request)?;
    let mut call = reqwest::Request::new(request.method().into(), parts.url);
    *call.headers_mut() = parts.headers;
    *call.body_mut() = parts.body.map(Into::into);
    Ok(call)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stub::{ok_response, StubAsyncEngine};
    use crate::engine::RawResponse;
    use courier_core::encode;

    fn service(engine: &StubAsyncEngine) -> AsyncRequestService {
        AsyncRequestService::with_engine(AsyncServiceConfig::default(), Arc::new(engine.clone()))
    }

    #[test]
    fn operations_before_init_report_not_initialized() {
        let service = AsyncRequestService::new(AsyncServiceConfig::default());

        let err = service
            .execute(Request::get("http://example.com/").build().unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::NotInitialized));

        let err = service
            .submit(Request::get("http://example.com/").build().unwrap())
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn init_is_idempotent_and_shutdown_guards_later_use() {
        let service = AsyncRequestService::new(AsyncServiceConfig {
            timeout: Some(Duration::from_secs(10)),
        });

        service.init().unwrap();
        service.init().unwrap();

        service.shutdown();
        let err = service
            .execute(Request::get("http://example.com/").build().unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::NotInitialized));
    }

    #[test]
    fn trace_is_rejected_at_submit() {
        let engine = StubAsyncEngine::new();
        let service = service(&engine);

        let err = service
            .submit(Request::trace("http://example.com/").build().unwrap())
            .unwrap_err();

        assert!(matches!(
            err,
            Error::UnsupportedMethod {
                backend: "async",
                method: Method::TRACE,
            }
        ));
        assert!(engine.recorded_calls().is_empty());
    }

    #[test]
    fn inline_completion_resolves_the_handle_before_wait() {
        let engine = StubAsyncEngine::new().with_response(RawResponse {
            status: 200,
            body: "done".to_string(),
            ..ok_response()
        });
        let service = service(&engine);

        let handle = service
            .submit(Request::get("http://example.com/data").build().unwrap())
            .unwrap();

        assert!(handle.state().is_complete());
        let response = handle.wait().unwrap();
        assert_eq!(response.content(), "done");
        assert_eq!(response.content_length(), 4);
    }

    #[test]
    fn form_body_and_headers_reach_the_wire_call() {
        let engine = StubAsyncEngine::new();
        let service = service(&engine);

        service
            .execute(
                Request::post("http://example.com/submit")
                    .with_header("X-Test", "a")
                    .with_parameter("a", "1")
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let recorded = engine.recorded_calls();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].method, "POST");
        assert_eq!(recorded[0].url, "http://example.com/submit");
        assert_eq!(recorded[0].body.as_deref(), Some("a=1"));
        assert!(recorded[0]
            .headers
            .contains(&("x-test".to_string(), "a".to_string())));
        assert!(recorded[0]
            .headers
            .contains(&("content-type".to_string(), encode::FORM_CONTENT_TYPE.to_string())));
    }

    #[test]
    fn locale_stays_absent_even_when_declared() {
        let engine = StubAsyncEngine::new().with_response(RawResponse {
            status: 200,
            headers: vec![("Content-Language".to_string(), "fr-FR".to_string())],
            ..ok_response()
        });
        let service = service(&engine);

        let response = service
            .execute(Request::get("http://example.com/data").build().unwrap())
            .unwrap();

        assert_eq!(response.locale(), None);
        assert_eq!(response.first_header("content-language"), Some("fr-FR"));
    }

    #[test]
    fn engine_failures_surface_at_wait() {
        let engine = StubAsyncEngine::new().fail_with("connection reset");
        let service = service(&engine);

        let handle = service
            .submit(Request::get("http://example.com/").build().unwrap())
            .unwrap();

        let err = handle.wait().unwrap_err();
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn dropped_completions_fail_the_handle_as_abandoned() {
        let engine = StubAsyncEngine::new().hold_completions();
        let service = service(&engine);

        let handle = service
            .submit(Request::get("http://example.com/").build().unwrap())
            .unwrap();

        let err = handle.wait().unwrap_err();
        assert!(err.to_string().contains("abandoned"));
    }
}
