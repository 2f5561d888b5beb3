//! Pipeline composition.
//!
//! A [`PipelineBuilder`] accumulates an ordered list of tower [`Layer`]
//! factories and composes them, once, around a terminal [`Transport`]. The
//! first registered layer is the outermost: it shapes the request first and
//! sees the response last.
//!
//! The builder/pipeline split is deliberately two-phase: [`PipelineBuilder::build`]
//! consumes the builder by value, so a pipeline can never be mutated after
//! requests have started flowing through it. Registering after build or
//! building twice does not compile.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;

use relais_core::{Envelope, Error, Request, Response, Result, Transport};

/// Type-erased pipeline stage.
///
/// Every stage maps an [`Envelope`] to an [`Envelope`]: request-shaping
/// before delegating to its inner stage, response-shaping after, with
/// short-circuiting allowed by not delegating at all.
pub type BoxedHandler = BoxCloneService<Envelope, Envelope, Error>;

/// Future type for pipeline stages.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Envelope>> + Send + 'static>>;

/// Thread-safe wrapper around the composed chain.
///
/// Tower services take `&mut self`; the mutex makes the pipeline shareable.
/// Each call locks only long enough to clone the service, so concurrent
/// traversals never contend past that point.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedHandler>>,
}

impl SyncService {
    fn new(service: BoxedHandler) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, envelope: Envelope) -> HandlerFuture {
        // Lock, clone the service, and release the lock immediately
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Box::pin(async move { service.call(envelope).await })
    }
}

// ============================================================================
// Terminal adapter
// ============================================================================

/// Adapter exposing a [`Transport`] as the innermost pipeline stage.
#[derive(Debug, Clone)]
pub struct TransportService<T> {
    transport: T,
}

impl<T> TransportService<T> {
    /// Wrap a transport as a pipeline terminal.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }
}

impl<T: Transport> Service<Envelope> for TransportService<T> {
    type Response = Envelope;
    type Error = Error;
    type Future = HandlerFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut envelope: Envelope) -> Self::Future {
        let transport = self.transport.clone();
        Box::pin(async move {
            let response = transport.send(envelope.request().clone()).await?;
            envelope.set_response(response);
            Ok(envelope)
        })
    }
}

// ============================================================================
// Builder
// ============================================================================

type LayerFactory = Box<dyn FnOnce(BoxedHandler) -> BoxedHandler + Send + Sync>;

/// Accumulates pipeline stages; consumed by [`PipelineBuilder::build`].
#[derive(Default)]
pub struct PipelineBuilder {
    layers: Vec<LayerFactory>,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl PipelineBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage factory.
    ///
    /// Registration order is significant: the first registered layer is the
    /// outermost, shaping the request first and the response last.
    #[must_use]
    pub fn register<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedHandler> + Send + Sync + 'static,
        L::Service: Service<Envelope, Response = Envelope, Error = Error> + Clone + Send + 'static,
        <L::Service as Service<Envelope>>::Future: Send,
    {
        self.layers.push(Box::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Compose the registered stages around a terminal transport.
    ///
    /// Folds the factory list right-to-left so registration order equals
    /// nesting order, and consumes the builder: the returned [`Pipeline`]
    /// is immutable.
    #[must_use]
    pub fn build<T: Transport>(self, terminal: T) -> Pipeline {
        let mut service: BoxedHandler = BoxCloneService::new(TransportService::new(terminal));

        for factory in self.layers.into_iter().rev() {
            service = factory(service);
        }

        Pipeline {
            service: SyncService::new(service),
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// The fully composed, immutable stage chain terminating in a transport.
///
/// Safe to invoke concurrently: per-call state lives entirely in the
/// [`Envelope`], allocated fresh by [`Pipeline::execute`].
#[derive(Clone)]
pub struct Pipeline {
    service: SyncService,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Drive one request through the chain.
    ///
    /// # Errors
    ///
    /// Propagates transport errors unchanged; configuration and codec
    /// failures surface as their respective [`Error`] variants.
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let envelope = Envelope::new(request);
        let envelope = self.service.call(envelope).await?;
        envelope
            .into_response()
            .ok_or_else(|| Error::connection("pipeline terminated without a response"))
    }
}
