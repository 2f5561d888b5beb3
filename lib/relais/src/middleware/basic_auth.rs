//! Basic authentication middleware.
//!
//! Before-phase only: adds an `Authorization: Basic <base64(login:password)>`
//! header to every outgoing request. The header value is computed once at
//! construction from immutable credentials.

use std::sync::Arc;
use std::task::{Context, Poll};

use base64::Engine;
use tower::{Layer, Service};

use relais_core::{Envelope, Error, Result};

use crate::pipeline::HandlerFuture;

/// Layer that adds basic authentication to requests.
///
/// Construction fails fast on blank credentials: an empty login or password
/// is a programmer error, not something to discover on the first request.
#[derive(Debug, Clone)]
pub struct BasicAuthLayer {
    /// Base64-encoded "login:password".
    encoded_credentials: Arc<str>,
}

impl BasicAuthLayer {
    /// Create a new basic auth layer with the given login and password.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if either credential is blank.
    pub fn new(login: impl AsRef<str>, password: impl AsRef<str>) -> Result<Self> {
        let login = login.as_ref();
        let password = password.as_ref();

        if login.trim().is_empty() {
            return Err(Error::configuration("basic auth login must not be blank"));
        }
        if password.trim().is_empty() {
            return Err(Error::configuration(
                "basic auth password must not be blank",
            ));
        }

        let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{login}:{password}"));
        Ok(Self {
            encoded_credentials: Arc::from(encoded),
        })
    }
}

impl<S> Layer<S> for BasicAuthLayer {
    type Service = BasicAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BasicAuth {
            inner,
            encoded_credentials: Arc::clone(&self.encoded_credentials),
        }
    }
}

/// Service that adds basic authentication to requests.
#[derive(Debug, Clone)]
pub struct BasicAuth<S> {
    inner: S,
    /// Base64-encoded "login:password".
    encoded_credentials: Arc<str>,
}

impl<S> Service<Envelope> for BasicAuth<S>
where
    S: Service<Envelope, Response = Envelope, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Envelope;
    type Error = Error;
    type Future = HandlerFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut envelope: Envelope) -> Self::Future {
        envelope.request_mut().headers_mut().insert(
            "Authorization",
            format!("Basic {}", self.encoded_credentials),
        );

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(envelope).await })
    }
}
