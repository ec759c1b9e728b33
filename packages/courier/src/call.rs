//! Wire call assembly shared by the backends.
//!
//! The encoding rules live in `courier_core::encode`; this module applies
//! them to one request and hands back the URL, header map, and optional form
//! body for a backend to stitch into its native call type.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

use courier_core::{encode, Error, Request, Result};

/// The engine-ready pieces of one wire call.
#[derive(Debug)]
pub(crate) struct WireParts {
    pub url: url::Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Encode the request into wire call pieces.
///
/// Parameters land in the URL or the form body according to the method, and
/// a form body brings its content type along. Header names and values that
/// cannot be put on the wire fail as execution errors.
pub(crate) fn wire_parts(request: &Request) -> Result<WireParts> {
    let url_text =
        encode::url_with_parameters(request.method(), request.url(), request.parameters());
    let url = url::Url::parse(&url_text)
        .map_err(|e| Error::execution(format!("invalid request URL {url_text:?}"), e))?;

    let mut headers = HeaderMap::new();
    for (name, values) in request.headers() {
        let header = HeaderName::try_from(name.as_str())
            .map_err(|e| Error::execution(format!("invalid header name {name:?}"), e))?;
        for value in values {
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| Error::execution(format!("invalid value for header {name:?}"), e))?;
            headers.append(header.clone(), value);
        }
    }

    let body = encode::form_body(request.method(), request.parameters());
    if body.is_some() {
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(encode::FORM_CONTENT_TYPE),
        );
    }

    Ok(WireParts { url, headers, body })
}
