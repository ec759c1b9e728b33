//! The engine seam: the narrow contracts Courier drives HTTP transports
//! through, and the production reqwest implementations.
//!
//! Engines only execute already-built wire calls and reduce their native
//! responses to [`RawResponse`]; everything else (encoding, transformation,
//! cookies) stays engine-independent. Tests substitute stub engines that
//! capture the outgoing call and answer with canned raw responses.

use std::time::Duration;

use reqwest::header::HeaderMap;

use courier_core::{Error, Result};

/// The engine-independent reduction of a native HTTP response.
///
/// Header pairs keep their arrival order, one entry per occurrence. The body
/// arrives already decoded to text by the engine's charset handling, and
/// `declared_length` is set only when the response itself declared an entity
/// length.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub declared_length: Option<u64>,
}

/// A transport that executes wire calls on the caller's thread.
pub trait BlockingEngine: Send + Sync {
    /// Execute the call and reduce its response, blocking until done.
    fn execute(&self, call: reqwest::blocking::Request) -> Result<RawResponse>;
}

/// Completion callback for [`AsyncEngine`] calls. Invoked exactly once.
pub type Completion = Box<dyn FnOnce(Result<RawResponse>) + Send + 'static>;

/// A transport that executes wire calls on its own runtime and reports the
/// outcome through a completion callback.
///
/// An engine that drops `done` without invoking it (torn-down runtime)
/// settles the waiting handle through the callback's drop path instead of
/// leaving it pending forever.
pub trait AsyncEngine: Send + Sync {
    fn execute(&self, call: reqwest::Request, done: Completion);
}

/// Production blocking engine over a shared reqwest client.
pub struct ReqwestEngine {
    client: reqwest::blocking::Client,
}

impl ReqwestEngine {
    /// Build the engine and its connection pool.
    pub fn new(max_idle_connections_per_host: usize, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .pool_max_idle_per_host(max_idle_connections_per_host);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::execution("error building HTTP engine", e))?;

        Ok(Self { client })
    }
}

impl BlockingEngine for ReqwestEngine {
    fn execute(&self, call: reqwest::blocking::Request) -> Result<RawResponse> {
        let response = self
            .client
            .execute(call)
            .map_err(|e| Error::execution("error executing HTTP call", e))?;

        let status = response.status().as_u16();
        let declared_length = response.content_length();
        let headers = header_pairs(response.headers());
        let body = response
            .text()
            .map_err(|e| Error::execution("error reading response body", e))?;

        Ok(RawResponse {
            status,
            headers,
            body,
            declared_length,
        })
    }
}

/// Production natively-async engine: a reqwest client on its own runtime.
///
/// Dropping the engine shuts the runtime down; calls still in flight are
/// cancelled and their handles settle as failed.
pub struct ReqwestAsyncEngine {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl ReqwestAsyncEngine {
    /// Build the engine, its client, and the runtime the calls run on.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| Error::execution("error starting engine runtime", e))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::execution("error building HTTP engine", e))?;

        Ok(Self { client, runtime })
    }
}

impl AsyncEngine for ReqwestAsyncEngine {
    fn execute(&self, call: reqwest::Request, done: Completion) {
        let client = self.client.clone();
        self.runtime.spawn(async move {
            let result = run_call(client, call).await;
            done(result);
        });
    }
}

async fn run_call(client: reqwest::Client, call: reqwest::Request) -> Result<RawResponse> {
    let response = client
        .execute(call)
        .await
        .map_err(|e| Error::execution("error executing HTTP call", e))?;

    let status = response.status().as_u16();
    let declared_length = response.content_length();
    let headers = header_pairs(response.headers());
    let body = response
        .text()
        .await
        .map_err(|e| Error::execution("error reading response body", e))?;

    Ok(RawResponse {
        status,
        headers,
        body,
        declared_length,
    })
}

fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// Stub engines for tests: record the outgoing wire call and answer with a
/// canned raw response, a failure, or nothing at all.
#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// What an engine saw on the wire side of one call.
    #[derive(Debug, Clone)]
    pub(crate) struct RecordedCall {
        pub method: String,
        pub url: String,
        pub headers: Vec<(String, String)>,
        pub body: Option<String>,
    }

    /// An empty 200 with no declared length.
    pub(crate) fn ok_response() -> RawResponse {
        RawResponse {
            status: 200,
            headers: Vec::new(),
            body: String::new(),
            declared_length: None,
        }
    }

    fn record(
        method: &http::Method,
        url: &url::Url,
        headers: &HeaderMap,
        body: Option<&[u8]>,
    ) -> RecordedCall {
        RecordedCall {
            method: method.as_str().to_string(),
            url: url.to_string(),
            headers: super::header_pairs(headers),
            body: body.map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    #[derive(Clone, Default)]
    pub(crate) struct StubBlockingEngine {
        response: Arc<Mutex<Option<RawResponse>>>,
        fail_message: Arc<Mutex<Option<String>>>,
        recorded: Arc<Mutex<Vec<RecordedCall>>>,
    }

    impl StubBlockingEngine {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Answer every call with this raw response.
        pub(crate) fn with_response(self, response: RawResponse) -> Self {
            *self.response.lock().unwrap() = Some(response);
            self
        }

        /// Fail every call with an execution error.
        pub(crate) fn fail_with(self, message: impl Into<String>) -> Self {
            *self.fail_message.lock().unwrap() = Some(message.into());
            self
        }

        pub(crate) fn recorded_calls(&self) -> Vec<RecordedCall> {
            self.recorded.lock().unwrap().clone()
        }
    }

    impl BlockingEngine for StubBlockingEngine {
        fn execute(&self, call: reqwest::blocking::Request) -> Result<RawResponse> {
            self.recorded.lock().unwrap().push(record(
                call.method(),
                call.url(),
                call.headers(),
                call.body().and_then(|body| body.as_bytes()),
            ));

            if let Some(message) = self.fail_message.lock().unwrap().clone() {
                return Err(Error::execution_message(message));
            }

            Ok(self
                .response
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(ok_response))
        }
    }

    #[derive(Clone, Default)]
    pub(crate) struct StubAsyncEngine {
        response: Arc<Mutex<Option<RawResponse>>>,
        fail_message: Arc<Mutex<Option<String>>>,
        hold_completion: Arc<Mutex<bool>>,
        recorded: Arc<Mutex<Vec<RecordedCall>>>,
    }

    impl StubAsyncEngine {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Answer every call with this raw response.
        pub(crate) fn with_response(self, response: RawResponse) -> Self {
            *self.response.lock().unwrap() = Some(response);
            self
        }

        /// Fail every call with an execution error.
        pub(crate) fn fail_with(self, message: impl Into<String>) -> Self {
            *self.fail_message.lock().unwrap() = Some(message.into());
            self
        }

        /// Drop the completion callback without invoking it.
        pub(crate) fn hold_completions(self) -> Self {
            *self.hold_completion.lock().unwrap() = true;
            self
        }

        pub(crate) fn recorded_calls(&self) -> Vec<RecordedCall> {
            self.recorded.lock().unwrap().clone()
        }
    }

    impl AsyncEngine for StubAsyncEngine {
        fn execute(&self, call: reqwest::Request, done: Completion) {
            self.recorded.lock().unwrap().push(record(
                call.method(),
                call.url(),
                call.headers(),
                call.body().and_then(|body| body.as_bytes()),
            ));

            if *self.hold_completion.lock().unwrap() {
                return;
            }

            if let Some(message) = self.fail_message.lock().unwrap().clone() {
                done(Err(Error::execution_message(message)));
                return;
            }

            let response = self
                .response
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(ok_response);
            done(Ok(response));
        }
    }
}
