//! Token authentication middleware.
//!
//! Before-phase only: adds an `Authorization: token <token>` header to every
//! outgoing request, with the value fixed at construction.

use std::sync::Arc;
use std::task::{Context, Poll};

use tower::{Layer, Service};

use relais_core::{Envelope, Error, Result};

use crate::pipeline::HandlerFuture;

/// Layer that adds token authentication to requests.
#[derive(Debug, Clone)]
pub struct TokenAuthLayer {
    token: Arc<str>,
}

impl TokenAuthLayer {
    /// Create a new token auth layer with the given token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the token is blank.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::configuration("auth token must not be blank"));
        }
        Ok(Self {
            token: Arc::from(token),
        })
    }
}

impl<S> Layer<S> for TokenAuthLayer {
    type Service = TokenAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TokenAuth {
            inner,
            token: Arc::clone(&self.token),
        }
    }
}

/// Service that adds token authentication to requests.
#[derive(Debug, Clone)]
pub struct TokenAuth<S> {
    inner: S,
    token: Arc<str>,
}

impl<S> Service<Envelope> for TokenAuth<S>
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
        envelope
            .request_mut()
            .headers_mut()
            .insert("Authorization", format!("token {}", self.token));

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(envelope).await })
    }
}
