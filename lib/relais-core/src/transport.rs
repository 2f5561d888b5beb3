//! The transport seam.

use std::future::Future;

use crate::{Request, Response, Result};

/// A transport performs the actual network exchange terminating a pipeline.
///
/// Implementations translate the generic [`Request`] into their underlying
/// HTTP primitives and the raw reply back into a [`Response`]. This is also
/// the decoration point for the caching transport, which wraps another
/// transport and may answer from its store instead of the network body.
///
/// A transport holds no per-call state; cloning must be cheap (share the
/// connection pool) so a composed pipeline can be invoked concurrently.
pub trait Transport: Clone + Send + Sync + 'static {
    /// Execute the request and return the reply.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, TLS failure, or timeout. A
    /// non-2xx status is not an error; it comes back as a [`Response`].
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}
