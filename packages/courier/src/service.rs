//! The backend-independent execution contract.

use courier_core::{Request, Response, Result};

use crate::handle::ResponseHandle;

/// A backend that turns declarative [`Request`]s into normalized
/// [`Response`]s.
///
/// Implementations must be initialized before use; both operations report a
/// configuration error (`Error::NotInitialized`) otherwise. Errors raised
/// before the request leaves the caller keep their original kind; transport
/// failures surface as execution errors.
pub trait RequestService: Send + Sync {
    /// Execute the request and block until its response is available.
    fn execute(&self, request: Request) -> Result<Response>;

    /// Submit the request for background execution.
    ///
    /// Returns a handle that resolves to the response once the transport
    /// finishes. Failures past this point surface when the handle is
    /// resolved, not here.
    fn submit(&self, request: Request) -> Result<ResponseHandle>;
}
