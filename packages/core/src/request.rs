use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::method::Method;

/// Mapping from a name to its ordered values.
///
/// Headers and parameters both allow repetition: values for one name keep
/// their insertion order, while names themselves iterate lexicographically.
pub type Multimap = BTreeMap<String, Vec<String>>;

/// A declarative HTTP request: what to call, independent of any engine.
///
/// Build one through [`Request::builder`] or the per-verb shortcuts such as
/// [`Request::get`]. Once built the request is immutable and its maps are
/// reachable read-only.
///
/// ```ignore
/// use courier_core::Request;
///
/// let request = Request::get("https://example.com/search")
///     .with_parameter("q", "rust")
///     .with_header("Accept", "text/html")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    url: String,
    method: Method,
    headers: Multimap,
    parameters: Multimap,
}

impl Request {
    /// Start building a request with the given URL and method.
    pub fn builder(url: impl Into<String>, method: Method) -> RequestBuilder {
        RequestBuilder {
            url: url.into(),
            method,
            headers: Multimap::new(),
            parameters: Multimap::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> RequestBuilder {
        Self::builder(url, Method::GET)
    }

    pub fn post(url: impl Into<String>) -> RequestBuilder {
        Self::builder(url, Method::POST)
    }

    pub fn put(url: impl Into<String>) -> RequestBuilder {
        Self::builder(url, Method::PUT)
    }

    pub fn delete(url: impl Into<String>) -> RequestBuilder {
        Self::builder(url, Method::DELETE)
    }

    pub fn options(url: impl Into<String>) -> RequestBuilder {
        Self::builder(url, Method::OPTIONS)
    }

    pub fn head(url: impl Into<String>) -> RequestBuilder {
        Self::builder(url, Method::HEAD)
    }

    pub fn trace(url: impl Into<String>) -> RequestBuilder {
        Self::builder(url, Method::TRACE)
    }

    pub fn connect(url: impl Into<String>) -> RequestBuilder {
        Self::builder(url, Method::CONNECT)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn headers(&self) -> &Multimap {
        &self.headers
    }

    pub fn parameters(&self) -> &Multimap {
        &self.parameters
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Builder for [`Request`].
///
/// `with_header` and `with_parameter` append: repeated names accumulate
/// values in call order rather than overwriting.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    url: String,
    method: Method,
    headers: Multimap,
    parameters: Multimap,
}

impl RequestBuilder {
    /// Append a header value for a name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Append a parameter value for a name.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Replace all headers with an already-assembled multimap.
    pub fn with_headers(mut self, headers: Multimap) -> Self {
        self.headers = headers;
        self
    }

    /// Replace all parameters with an already-assembled multimap.
    pub fn with_parameters(mut self, parameters: Multimap) -> Self {
        self.parameters = parameters;
        self
    }

    /// Validate and build the immutable request.
    ///
    /// Fails with [`Error::InvalidRequest`] when the URL is blank.
    pub fn build(self) -> Result<Request> {
        if self.url.trim().is_empty() {
            return Err(Error::InvalidRequest {
                message: "the url must be set".to_string(),
            });
        }

        Ok(Request {
            url: self.url,
            method: self.method,
            headers: self.headers,
            parameters: self.parameters,
        })
    }
}
