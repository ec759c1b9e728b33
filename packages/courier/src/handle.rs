//! Single-resolution handles for submitted requests.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use courier_core::{Error, Response, Result};

/// The state of a submitted request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    /// Request is in progress
    Pending,
    /// Request completed successfully
    Complete,
    /// Request failed with an error
    Failed,
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, RequestState::Complete)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RequestState::Failed)
    }
}

enum Outcome {
    Pending,
    Complete(Response),
    Failed(Error),
}

struct Shared {
    outcome: Mutex<Outcome>,
    resolved: Condvar,
}

/// A future-like handle to the response of a submitted request.
///
/// The handle settles exactly once, to a [`Response`] or to the error the
/// backend recorded. Dropping an unresolved handle only detaches the waiter;
/// work already submitted still runs to completion on the backend.
pub struct ResponseHandle {
    shared: Arc<Shared>,
}

impl ResponseHandle {
    /// Create a connected handle/resolver pair.
    pub(crate) fn new() -> (ResponseHandle, Resolver) {
        let shared = Arc::new(Shared {
            outcome: Mutex::new(Outcome::Pending),
            resolved: Condvar::new(),
        });
        let handle = ResponseHandle {
            shared: Arc::clone(&shared),
        };
        let resolver = Resolver {
            shared,
            done: false,
        };
        (handle, resolver)
    }

    /// The current state, without blocking.
    pub fn state(&self) -> RequestState {
        match *self.shared.outcome.lock().unwrap() {
            Outcome::Pending => RequestState::Pending,
            Outcome::Complete(_) => RequestState::Complete,
            Outcome::Failed(_) => RequestState::Failed,
        }
    }

    /// Block until the request settles and return its outcome.
    pub fn wait(self) -> Result<Response> {
        let mut outcome = self.shared.outcome.lock().unwrap();
        loop {
            match std::mem::replace(&mut *outcome, Outcome::Pending) {
                Outcome::Pending => outcome = self.shared.resolved.wait(outcome).unwrap(),
                Outcome::Complete(response) => return Ok(response),
                Outcome::Failed(error) => return Err(error),
            }
        }
    }

    /// Block for at most `timeout` waiting for the request to settle.
    ///
    /// Returns the handle back in `Err` when the timeout elapses first, so
    /// the caller can keep polling or waiting.
    pub fn wait_timeout(
        self,
        timeout: Duration,
    ) -> std::result::Result<Result<Response>, ResponseHandle> {
        let deadline = Instant::now() + timeout;
        let mut outcome = self.shared.outcome.lock().unwrap();
        loop {
            match std::mem::replace(&mut *outcome, Outcome::Pending) {
                Outcome::Pending => {}
                Outcome::Complete(response) => return Ok(Ok(response)),
                Outcome::Failed(error) => return Ok(Err(error)),
            }

            let now = Instant::now();
            if now >= deadline {
                drop(outcome);
                return Err(self);
            }

            let (guard, _) = self
                .shared
                .resolved
                .wait_timeout(outcome, deadline - now)
                .unwrap();
            outcome = guard;
        }
    }
}

impl fmt::Debug for ResponseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseHandle")
            .field("state", &self.state())
            .finish()
    }
}

/// The resolving side of a handle, held by the backend running the request.
///
/// Consumed by [`Resolver::complete`] or [`Resolver::fail`]. Dropping it
/// unresolved fails the handle, so a torn-down backend never leaves a waiter
/// blocked forever.
pub(crate) struct Resolver {
    shared: Arc<Shared>,
    done: bool,
}

impl Resolver {
    pub(crate) fn complete(mut self, response: Response) {
        self.resolve(Outcome::Complete(response));
    }

    pub(crate) fn fail(mut self, error: Error) {
        self.resolve(Outcome::Failed(error));
    }

    fn resolve(&mut self, resolution: Outcome) {
        if self.done {
            return;
        }
        self.done = true;

        let mut outcome = self.shared.outcome.lock().unwrap();
        if matches!(*outcome, Outcome::Pending) {
            *outcome = resolution;
        }
        self.shared.resolved.notify_all();
    }
}

impl Drop for Resolver {
    fn drop(&mut self) {
        if !self.done {
            self.resolve(Outcome::Failed(Error::execution_message(
                "request was abandoned before it completed",
            )));
        }
    }
}
