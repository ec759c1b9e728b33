//! Response cookie extraction.
//!
//! Cookies arrive as one or more `Set-Cookie` header occurrences. Extraction
//! is best-effort: it takes the primary `name=value` pair of each element and
//! never fails the surrounding response assembly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A cookie name that violates the RFC 6265 token grammar.
#[derive(Debug, Error)]
#[error("invalid cookie name: {name:?}")]
pub struct InvalidCookie {
    pub name: String,
}

/// A single response cookie.
///
/// Only the name and value survive extraction; attributes such as path,
/// domain, and expiry are read off the wire and discarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
}

impl Cookie {
    /// Create a cookie, validating the name as an RFC 6265 token.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, InvalidCookie> {
        let name = name.into();
        if !is_token(&name) {
            return Err(InvalidCookie { name });
        }
        Ok(Self {
            name,
            value: value.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Extract cookies from the values of every `Set-Cookie` occurrence.
///
/// Each header value is split into comma-delimited elements; each element is
/// split on `;` and only the leading `name=value` pair is kept. A blank name
/// skips the element silently, an invalid name is logged and skipped, and a
/// later occurrence of a name replaces the earlier one.
pub fn cookies_from_header_values<'a, I>(values: I) -> BTreeMap<String, Cookie>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut cookies = BTreeMap::new();

    for value in values {
        for element in value.split(',') {
            // TODO: capture the attribute segments (path, domain, max-age)
            // on the cookie instead of dropping them here.
            let pair = element.split(';').next().unwrap_or("");

            let (name, value) = match pair.split_once('=') {
                Some((name, value)) => (name.trim(), value.trim()),
                None => (pair.trim(), ""),
            };

            if name.is_empty() {
                continue;
            }

            match Cookie::new(name, value) {
                Ok(cookie) => {
                    cookies.insert(name.to_string(), cookie);
                }
                Err(err) => {
                    log::warn!("Error creating cookie: {err}");
                }
            }
        }
    }

    cookies
}

/// RFC 6265 token: visible ASCII excluding separators.
fn is_token(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_token_byte)
}

fn is_token_byte(byte: u8) -> bool {
    matches!(byte, 0x21..=0x7e) && !br#"()<>@,;:\"/[]?={}"#.contains(&byte)
}
