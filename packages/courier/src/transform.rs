//! Shared reduction from raw engine output to the normalized [`Response`].
//!
//! Both services funnel their engines' output through here so that header
//! normalization, cookie extraction, and the content-length fallback behave
//! identically no matter which backend produced the response.

use std::sync::Arc;

use courier_core::{cookie, Request, Response};

use crate::engine::RawResponse;

/// First `Content-Language` value the response declared, if any.
pub(crate) fn content_language(raw: &RawResponse) -> Option<String> {
    raw.headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-language"))
        .map(|(_, value)| value.clone())
}

/// Reduce raw engine output to a normalized response.
///
/// Header names are lowercased and every occurrence aggregated in arrival
/// order. Cookies come from the `Set-Cookie` values. The content type is the
/// first `Content-Type` value. The content length is the declared entity
/// length when the response carried one, otherwise the character count of
/// the decoded body.
pub(crate) fn response_from_raw(
    request: Arc<Request>,
    raw: RawResponse,
    locale: Option<String>,
) -> Response {
    let mut builder = Response::builder(request, raw.status);

    let mut set_cookie_values = Vec::new();
    for (name, value) in &raw.headers {
        if name.eq_ignore_ascii_case("set-cookie") {
            set_cookie_values.push(value.as_str());
        }
        builder = builder.header(name, value);
    }

    for (_, cookie) in cookie::cookies_from_header_values(set_cookie_values) {
        builder = builder.cookie(cookie);
    }

    if let Some(content_type) = raw
        .headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| value.clone())
    {
        builder = builder.content_type(content_type);
    }

    let content_length = raw
        .declared_length
        .unwrap_or_else(|| raw.body.chars().count() as u64);
    builder = builder.content_length(content_length);

    if let Some(locale) = locale {
        builder = builder.locale(locale);
    }

    builder.content(raw.body).build()
}
