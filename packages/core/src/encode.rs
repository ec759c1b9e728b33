//! The parameter encoding pipeline.
//!
//! Request parameters end up in one of two places depending on the method:
//! POST and PUT carry them as a URL-encoded form body and leave the URL
//! untouched, every other method appends them to the URL as a query string.

use url::form_urlencoded;

use crate::method::Method;
use crate::request::Multimap;

/// Content type carried by a form-encoded request body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Explode the parameter multimap into a flat ordered sequence of pairs.
///
/// All values for a name stay adjacent and keep their insertion order; names
/// iterate lexicographically.
pub fn parameter_pairs(parameters: &Multimap) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();
    for (name, values) in parameters {
        for value in values {
            pairs.push((name.as_str(), value.as_str()));
        }
    }
    pairs
}

/// URL-encode pairs into a `name=value&name=value` string.
pub fn query_string(pairs: &[(&str, &str)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}

/// Append the encoded parameters to the URL for methods that carry them in
/// the query string.
///
/// POST and PUT URLs are returned unchanged. For every other method the URL
/// keeps its original prefix byte-for-byte and gains a `?` when it had no
/// query section (even with zero parameters), or an `&` before the generated
/// parameters when it already had one.
pub fn url_with_parameters(method: Method, url: &str, parameters: &Multimap) -> String {
    if method.encodes_body() {
        return url.to_string();
    }

    let query = query_string(&parameter_pairs(parameters));

    let mut altered = String::with_capacity(url.len() + query.len() + 1);
    altered.push_str(url);
    if !url.contains('?') {
        altered.push('?');
    } else if !query.is_empty() {
        altered.push('&');
    }
    altered.push_str(&query);
    altered
}

/// Form-encode the parameters for a body-carrying method.
///
/// Returns `None` for methods that do not encode a body and when there are
/// no pairs at all, in which case no entity must be set on the call.
pub fn form_body(method: Method, parameters: &Multimap) -> Option<String> {
    if !method.encodes_body() {
        return None;
    }

    let pairs = parameter_pairs(parameters);
    if pairs.is_empty() {
        return None;
    }

    Some(query_string(&pairs))
}
