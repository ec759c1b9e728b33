//! Error types shared by every Courier backend.

use thiserror::Error;

use crate::method::Method;

/// Errors surfaced by Courier operations.
///
/// Every backend funnels its failures through this one type: configuration
/// and misuse problems keep their own variants, while transport-level faults
/// of any kind are wrapped into [`Error::Execution`] so raw engine errors
/// never reach callers directly.
#[derive(Debug, Error)]
pub enum Error {
    /// The request description is invalid, for example a blank URL.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// The string does not name an HTTP verb.
    #[error("invalid HTTP method: {method}")]
    InvalidMethod { method: String },

    /// The chosen backend cannot express this HTTP verb.
    #[error("{backend} backend does not support {method}")]
    UnsupportedMethod {
        backend: &'static str,
        method: Method,
    },

    /// The service was used before `init()` completed or after shutdown.
    #[error("request service not initialized")]
    NotInitialized,

    /// A failure building the wire call, executing it, or reading the
    /// response. Carries the underlying cause when one exists.
    #[error("error executing request: {message}")]
    Execution {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Wrap a backend failure, keeping the original cause on the chain.
    pub fn execution(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Execution {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// An execution failure with no underlying cause to record.
    pub fn execution_message(message: impl Into<String>) -> Self {
        Error::Execution {
            message: message.into(),
            source: None,
        }
    }

    /// True for misconfiguration and misuse, as opposed to transport faults.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Error::Execution { .. })
    }
}

/// Result type alias for Courier operations.
pub type Result<T> = std::result::Result<T, Error>;
