//! Transparent response caching with conditional-GET revalidation.
//!
//! [`CachingTransport`] decorates any [`Transport`]. For GET requests it
//! consults a [`ResponseCache`]; when a cached snapshot carries an ETag it
//! reissues the request with `If-None-Match` so the origin server decides
//! freshness. A `304 Not Modified` reply is answered from the stored
//! snapshot: the conditional round trip still happens, only the body
//! transfer is saved.
//!
//! The cache is strictly fail-open: a store that errors on every `get` and
//! `set` (or one that was never wired up correctly) costs performance, never
//! correctness. No cache failure is ever propagated to the caller.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use derive_more::Display;
use tracing::{debug, warn};

use relais_core::{HeaderMap, Request, Response, Result, Transport};

/// Error type for pluggable cache stores.
///
/// Whatever a store throws is swallowed at the caching-transport boundary;
/// the boxed form keeps the trait open to any backend.
pub type CacheError = Box<dyn std::error::Error + Send + Sync>;

/// A request identity: method + full URL, query string included.
///
/// Headers do not participate (no vary support).
#[derive(Debug, Clone, Display, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// The identity of a request.
    #[must_use]
    pub fn of(request: &Request) -> Self {
        Self(request.cache_key())
    }
}

/// An immutable snapshot of a previously observed response.
///
/// Snapshots are superseded wholesale on revalidation, never partially
/// updated.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
    content_type: Option<String>,
    etag: Option<String>,
}

impl CachedResponse {
    /// Snapshot a response for storage.
    #[must_use]
    pub fn from_response(response: &Response) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
            body: response.body().clone(),
            content_type: response.header("Content-Type").map(ToOwned::to_owned),
            etag: response
                .header("ETag")
                .map(str::trim)
                .filter(|etag| !etag.is_empty())
                .map(ToOwned::to_owned),
        }
    }

    /// The stored validator, if usable.
    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// Whether this snapshot can be revalidated. A record without an ETag
    /// is stored but behaves as a miss on the next lookup.
    #[must_use]
    pub fn has_validator(&self) -> bool {
        self.etag.is_some()
    }

    /// Rebuild a response from the snapshot, served in place of a 304.
    #[must_use]
    pub fn to_response(&self) -> Response {
        let mut headers = self.headers.clone();
        if let Some(content_type) = &self.content_type {
            headers.insert("Content-Type", content_type.clone());
        }
        Response::new(self.status, headers, self.body.clone())
    }
}

/// A key-value store mapping request identities to response snapshots.
///
/// Implementations must tolerate concurrent `get`/`set`, including for the
/// same key; linearizability is not required. A race between two
/// revalidations of one key may leave either snapshot stored, and the next
/// revalidation corrects it.
pub trait ResponseCache: Send + Sync + 'static {
    /// Look up the snapshot for a request identity.
    ///
    /// # Errors
    ///
    /// Store failures are allowed; the caching transport downgrades them to
    /// a miss.
    fn get(&self, key: &CacheKey) -> std::result::Result<Option<CachedResponse>, CacheError>;

    /// Store (or overwrite) the snapshot for a request identity.
    ///
    /// # Errors
    ///
    /// Store failures are allowed; the caching transport skips the store
    /// and still returns the live response.
    fn set(&self, key: CacheKey, response: CachedResponse)
    -> std::result::Result<(), CacheError>;
}

/// In-memory reference store.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<CacheKey, CachedResponse>>,
}

impl InMemoryCache {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseCache for InMemoryCache {
    fn get(&self, key: &CacheKey) -> std::result::Result<Option<CachedResponse>, CacheError> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(
        &self,
        key: CacheKey,
        response: CachedResponse,
    ) -> std::result::Result<(), CacheError> {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key, response);
        Ok(())
    }
}

/// Transport decorator performing conditional-GET caching.
///
/// Only GET requests consult or populate the store; every other method
/// passes straight through to the wrapped transport.
#[derive(Clone)]
pub struct CachingTransport<T> {
    inner: T,
    store: Arc<dyn ResponseCache>,
}

impl<T> std::fmt::Debug for CachingTransport<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingTransport").finish_non_exhaustive()
    }
}

impl<T: Transport> CachingTransport<T> {
    /// Decorate a transport with an in-memory cache.
    #[must_use]
    pub fn new(inner: T) -> Self {
        Self::with_store(inner, Arc::new(InMemoryCache::new()))
    }

    /// Decorate a transport with a caller-supplied store.
    #[must_use]
    pub fn with_store(inner: T, store: Arc<dyn ResponseCache>) -> Self {
        Self { inner, store }
    }

    fn lookup(&self, key: &CacheKey) -> Option<CachedResponse> {
        match self.store.get(key) {
            Ok(cached) => cached,
            Err(error) => {
                warn!(key = %key, %error, "cache lookup failed, treating as miss");
                None
            }
        }
    }

    fn try_store(&self, key: &CacheKey, response: &Response) {
        if !response.is_success() {
            return;
        }
        let snapshot = CachedResponse::from_response(response);
        if let Err(error) = self.store.set(key.clone(), snapshot) {
            warn!(key = %key, %error, "cache store failed, response not cached");
        }
    }

    /// Reissue the request with `If-None-Match`; serve the snapshot on 304,
    /// otherwise take the live reply as authoritative and supersede the
    /// snapshot.
    async fn revalidate(
        &self,
        key: &CacheKey,
        request: Request,
        snapshot: CachedResponse,
        etag: String,
    ) -> Result<Response> {
        let mut conditional = request;
        conditional.headers_mut().insert("If-None-Match", etag);

        let response = self.inner.send(conditional).await?;

        if response.is_not_modified() {
            debug!(key = %key, "not modified, serving cached body");
            return Ok(snapshot.to_response());
        }

        self.try_store(key, &response);
        Ok(response)
    }
}

impl<T: Transport> Transport for CachingTransport<T> {
    async fn send(&self, request: Request) -> Result<Response> {
        if !request.method().is_cacheable() {
            return self.inner.send(request).await;
        }

        let key = CacheKey::of(&request);

        if let Some(snapshot) = self.lookup(&key)
            && let Some(etag) = snapshot.etag().map(ToOwned::to_owned)
        {
            return self.revalidate(&key, request, snapshot, etag).await;
        }

        // Miss, or a snapshot without a usable validator
        let response = self.inner.send(request).await?;
        self.try_store(&key, &response);
        Ok(response)
    }
}
