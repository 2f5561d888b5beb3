//! JSON codec middleware.
//!
//! Before-phase: a structured [`Body::Json`] payload is serialized to bytes
//! and the `Content-Type` header set, so the transport only ever sees
//! wire-ready payloads. After-phase: a non-empty reply body with a JSON
//! content type is parsed into the response's document slot, from which
//! [`relais_core::Response::typed`] projects the caller's target type. An
//! empty body leaves the slot unset; typed projection then yields the
//! default value, since several endpoints answer success with no content.

use std::task::{Context, Poll};

use tower::{Layer, Service};

use relais_core::{Body, Envelope, Error, Result, to_json};

use crate::pipeline::HandlerFuture;

/// Layer that serializes request payloads and parses response bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodecLayer;

impl JsonCodecLayer {
    /// Create a new JSON codec layer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for JsonCodecLayer {
    type Service = JsonCodec<S>;

    fn layer(&self, inner: S) -> Self::Service {
        JsonCodec { inner }
    }
}

/// Service that serializes request payloads and parses response bodies.
#[derive(Debug, Clone)]
pub struct JsonCodec<S> {
    inner: S,
}

fn is_json_content_type(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.contains("json"))
}

impl<S> Service<Envelope> for JsonCodec<S>
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
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if let Body::Json(value) = envelope.request().body() {
                let bytes = to_json(value)?;
                let request = envelope.request_mut();
                request.set_body(Body::Bytes(bytes));
                request
                    .headers_mut()
                    .insert("Content-Type", "application/json");
            }

            let mut envelope = inner.call(envelope).await?;

            if let Some(response) = envelope.response_mut()
                && !response.body().is_empty()
                && is_json_content_type(response.header("Content-Type"))
            {
                let document: serde_json::Value = relais_core::from_json(response.body())?;
                response.set_document(document);
            }

            Ok(envelope)
        })
    }
}
