//! Response metadata extraction middleware.
//!
//! After-phase only: parses the well-known rate-limit, OAuth-scope, etag,
//! and pagination-link headers into an [`ApiInfo`] attached to the
//! response. Extraction degrades to defaults, so this stage never turns a
//! reply into a failure.

use std::task::{Context, Poll};

use tower::{Layer, Service};

use relais_core::{ApiInfo, Envelope, Error, Result};

use crate::pipeline::HandlerFuture;

/// Layer that attaches [`ApiInfo`] to responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataLayer;

impl MetadataLayer {
    /// Create a new metadata layer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for MetadataLayer {
    type Service = Metadata<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Metadata { inner }
    }
}

/// Service that attaches [`ApiInfo`] to responses.
#[derive(Debug, Clone)]
pub struct Metadata<S> {
    inner: S,
}

impl<S> Service<Envelope> for Metadata<S>
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

    fn call(&mut self, envelope: Envelope) -> Self::Future {
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let mut envelope = inner.call(envelope).await?;

            if let Some(response) = envelope.response_mut() {
                let api_info = ApiInfo::from_headers(response.headers());
                response.set_api_info(api_info);
            }

            Ok(envelope)
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use relais_core::{HeaderMap, Method, Request, Response, Transport};

    use super::*;
    use crate::pipeline::PipelineBuilder;

    #[derive(Clone)]
    struct FixedTransport {
        headers: HeaderMap,
    }

    impl Transport for FixedTransport {
        async fn send(&self, _request: Request) -> Result<Response> {
            Ok(Response::new(200, self.headers.clone(), Bytes::new()))
        }
    }

    fn get() -> Request {
        let url = url::Url::parse("https://api.example.com/x").expect("valid URL");
        Request::builder(Method::Get, url).build()
    }

    #[tokio::test]
    async fn attaches_api_info() {
        let headers: HeaderMap = [
            ("X-RateLimit-Limit", "60"),
            ("X-RateLimit-Remaining", "59"),
            ("ETag", "\"v1\""),
        ]
        .into_iter()
        .collect();

        let pipeline = PipelineBuilder::new()
            .register(MetadataLayer::new())
            .build(FixedTransport { headers });

        let response = pipeline.execute(get()).await.expect("response");
        let info = response.api_info().expect("api info");

        assert_eq!(info.rate_limit, 60);
        assert_eq!(info.rate_limit_remaining, 59);
        assert_eq!(info.etag.as_deref(), Some("\"v1\""));
    }

    #[tokio::test]
    async fn missing_headers_yield_defaults() {
        let pipeline = PipelineBuilder::new()
            .register(MetadataLayer::new())
            .build(FixedTransport {
                headers: HeaderMap::new(),
            });

        let response = pipeline.execute(get()).await.expect("response");
        let info = response.api_info().expect("api info");

        assert_eq!(info.rate_limit, 0);
        assert_eq!(info.rate_limit_remaining, 0);
        assert!(info.oauth_scopes.is_empty());
        assert!(info.accepted_oauth_scopes.is_empty());
        assert!(info.etag.is_none());
    }
}
