use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::cookie::Cookie;
use crate::request::{Multimap, Request};

/// A normalized HTTP response, independent of the engine that produced it.
///
/// Header names are lowercased during assembly and every occurrence of a
/// name is aggregated into its value list. [`Response::header_values`] looks
/// names up case-insensitively so callers can keep writing them any way.
/// The response holds a read-only back-reference to the [`Request`] that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    request: Arc<Request>,
    status: u16,
    content_type: Option<String>,
    content_length: u64,
    headers: Multimap,
    cookies: BTreeMap<String, Cookie>,
    content: String,
    locale: Option<String>,
}

impl Response {
    /// Start assembling a response for the given request and status.
    pub fn builder(request: Arc<Request>, status: u16) -> ResponseBuilder {
        ResponseBuilder {
            request,
            status,
            content_type: None,
            content_length: 0,
            headers: Multimap::new(),
            cookies: BTreeMap::new(),
            content: String::new(),
            locale: None,
        }
    }

    /// The request this response answers.
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The entity length the engine declared when it declared one, otherwise
    /// the decoded content's character count. The fallback understates the
    /// byte length of multi-byte content.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// All response headers, keyed by lowercased name.
    pub fn headers(&self) -> &Multimap {
        &self.headers
    }

    /// All values for a header name, looked up case-insensitively.
    ///
    /// Returns an empty slice when the header is absent.
    pub fn header_values(&self, name: &str) -> &[String] {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The first value for a header name, looked up case-insensitively.
    pub fn first_header(&self, name: &str) -> Option<&str> {
        self.header_values(name).first().map(String::as_str)
    }

    /// Cookies extracted from the `Set-Cookie` headers, keyed by name.
    pub fn cookies(&self) -> &BTreeMap<String, Cookie> {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    /// The decoded response body.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The response locale, when the backend surfaces one.
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Check if the response status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response status indicates a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the response status indicates a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.request, self.status)
    }
}

/// Transient construction aid for [`Response`].
///
/// Performs no validation beyond structural assembly: any combination of
/// empty or absent optional fields is a valid response.
#[derive(Debug)]
pub struct ResponseBuilder {
    request: Arc<Request>,
    status: u16,
    content_type: Option<String>,
    content_length: u64,
    headers: Multimap,
    cookies: BTreeMap<String, Cookie>,
    content: String,
    locale: Option<String>,
}

impl ResponseBuilder {
    pub fn content_type(mut self, value: impl Into<String>) -> Self {
        self.content_type = Some(value.into());
        self
    }

    pub fn content_length(mut self, length: u64) -> Self {
        self.content_length = length;
        self
    }

    /// Append one header occurrence; the name is stored lowercased and the
    /// value is added to the name's list rather than overwriting it.
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.as_ref().to_ascii_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    /// Add a cookie; a later cookie with the same name replaces the earlier.
    pub fn cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.insert(cookie.name().to_string(), cookie);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn build(self) -> Response {
        Response {
            request: self.request,
            status: self.status,
            content_type: self.content_type,
            content_length: self.content_length,
            headers: self.headers,
            cookies: self.cookies,
            content: self.content,
            locale: self.locale,
        }
    }
}
