//! Per-call request/response container.

use crate::{Request, Response};

/// The unit of work traversing a pipeline: exactly one request and, once a
/// transport has answered, one response.
///
/// An envelope is created fresh for every call and never shared between
/// concurrent calls; all per-call mutable state lives here, which is what
/// makes a composed pipeline safe to invoke concurrently.
#[derive(Debug, Clone)]
pub struct Envelope {
    request: Request,
    response: Option<Response>,
}

impl Envelope {
    /// Wrap a request for one traversal.
    #[must_use]
    pub const fn new(request: Request) -> Self {
        Self {
            request,
            response: None,
        }
    }

    /// The outgoing request.
    #[must_use]
    pub const fn request(&self) -> &Request {
        &self.request
    }

    /// Mutable access for request-shaping (before) phases.
    #[must_use]
    pub const fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// The response, once a transport (or a short-circuiting stage) set one.
    #[must_use]
    pub const fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Mutable access for response-shaping (after) phases.
    #[must_use]
    pub const fn response_mut(&mut self) -> Option<&mut Response> {
        self.response.as_mut()
    }

    /// Attach the response. The terminal transport calls this; a caching
    /// stage may call it again to replace a reply with a synthesized one.
    pub fn set_response(&mut self, response: Response) {
        self.response = Some(response);
    }

    /// Consume into the response, if one was set.
    #[must_use]
    pub fn into_response(self) -> Option<Response> {
        self.response
    }
}
