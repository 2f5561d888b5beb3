//! High-level API client.
//!
//! [`ApiClient`] owns a base URL and a frozen pipeline: authentication,
//! metadata extraction, and the JSON codec composed around the HTTP
//! transport, optionally decorated with a conditional-GET cache. Build one
//! with [`ApiClient::builder`], then issue requests with the verb helpers
//! or [`ApiClient::execute`] for full control.
//!
//! # Example
//!
//! ```no_run
//! use relais::{ApiClient, Credentials};
//!
//! # async fn example() -> relais::Result<()> {
//! let client = ApiClient::builder("https://api.github.com")
//!     .credentials(Credentials::token("ghp_…"))
//!     .cached()
//!     .build()?;
//!
//! let response = client.get("users/octocat").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::Serialize;

use relais_core::{Error, Method, Request, RequestBuilder, Response, Result};

use crate::cache::{CachingTransport, ResponseCache};
use crate::config::ClientConfig;
use crate::middleware::{
    BasicAuthLayer, JsonCodecLayer, LoggingLayer, MetadataLayer, TokenAuthLayer,
};
use crate::pipeline::{Pipeline, PipelineBuilder};
use crate::transport::HyperTransport;

/// Authentication scheme for an [`ApiClient`].
///
/// At most one `Authorization` strategy is active per client.
#[derive(Clone, Default)]
pub enum Credentials {
    /// No `Authorization` header is sent.
    #[default]
    Anonymous,
    /// HTTP Basic authentication.
    Basic {
        /// Account login.
        login: String,
        /// Account password or personal access token.
        password: String,
    },
    /// Token authentication (`Authorization: token <token>`).
    Token(String),
}

impl Credentials {
    /// Basic credentials.
    pub fn basic(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            login: login.into(),
            password: password.into(),
        }
    }

    /// Token credentials.
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(token.into())
    }
}

// Secrets stay out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Basic { login, .. } => f
                .debug_struct("Basic")
                .field("login", login)
                .field("password", &"***")
                .finish(),
            Self::Token(_) => f.debug_tuple("Token").field(&"***").finish(),
        }
    }
}

#[derive(Clone, Default)]
enum CacheChoice {
    #[default]
    Disabled,
    InMemory,
    Store(Arc<dyn ResponseCache>),
}

/// Builder for [`ApiClient`].
#[derive(Debug)]
pub struct ApiClientBuilder {
    base_url: String,
    credentials: Credentials,
    config: ClientConfig,
    logging: Option<LoggingLayer>,
    cache: CacheChoice,
}

impl std::fmt::Debug for CacheChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::InMemory => f.write_str("InMemory"),
            Self::Store(_) => f.write_str("Store(..)"),
        }
    }
}

impl ApiClientBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: Credentials::Anonymous,
            config: ClientConfig::default(),
            logging: None,
            cache: CacheChoice::Disabled,
        }
    }

    /// Set the authentication scheme.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the transport configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable request/response logging.
    #[must_use]
    pub fn logging(mut self, layer: LoggingLayer) -> Self {
        self.logging = Some(layer);
        self
    }

    /// Enable conditional-GET caching with an in-memory store.
    #[must_use]
    pub fn cached(mut self) -> Self {
        self.cache = CacheChoice::InMemory;
        self
    }

    /// Enable conditional-GET caching with a caller-supplied store.
    #[must_use]
    pub fn cached_with(mut self, store: Arc<dyn ResponseCache>) -> Self {
        self.cache = CacheChoice::Store(store);
        self
    }

    /// Build the client, freezing the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the base URL does not parse, and
    /// [`Error::Configuration`] for an unusable base URL or blank
    /// credentials.
    pub fn build(self) -> Result<ApiClient> {
        let base_url = url::Url::parse(&self.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::configuration(format!(
                "base URL cannot carry endpoint paths: {base_url}"
            )));
        }

        let mut builder = PipelineBuilder::new();

        if let Some(logging) = self.logging {
            builder = builder.register(logging);
        }

        builder = match self.credentials {
            Credentials::Anonymous => builder,
            Credentials::Basic { login, password } => {
                builder.register(BasicAuthLayer::new(login, password)?)
            }
            Credentials::Token(token) => builder.register(TokenAuthLayer::new(token)?),
        };

        let builder = builder
            .register(MetadataLayer::new())
            .register(JsonCodecLayer::new());

        let transport = HyperTransport::with_config(self.config);

        let pipeline = match self.cache {
            CacheChoice::Disabled => builder.build(transport),
            CacheChoice::InMemory => builder.build(CachingTransport::new(transport)),
            CacheChoice::Store(store) => {
                builder.build(CachingTransport::with_store(transport, store))
            }
        };

        Ok(ApiClient { base_url, pipeline })
    }
}

/// A typed HTTP/JSON API client with a frozen request pipeline.
///
/// Cheap to clone; clones share the pipeline and the transport's connection
/// pool, and the client is safe to use from concurrent tasks.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: url::Url,
    pipeline: Pipeline,
}

impl ApiClient {
    /// Start building a client for the given base URL.
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(base_url)
    }

    /// Build an anonymous client with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the base URL does not parse.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder(base_url).build()
    }

    /// The resolved base URL.
    #[must_use]
    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    /// Start a request against an endpoint path, for callers that need
    /// extra headers or query parameters before [`ApiClient::execute`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the path does not resolve against
    /// the base URL.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Request::endpoint(method, &self.base_url, path)
    }

    /// Drive a fully built request through the pipeline.
    ///
    /// Non-2xx statuses are not errors; inspect [`Response::is_success`].
    ///
    /// # Errors
    ///
    /// Propagates pipeline errors: connection, TLS, timeout, and codec
    /// failures.
    pub async fn execute(&self, request: Request) -> Result<Response> {
        self.pipeline.execute(request).await
    }

    /// GET an endpoint path.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn get(&self, path: &str) -> Result<Response> {
        let request = self.request(Method::Get, path)?.build();
        self.execute(request).await
    }

    /// POST a JSON payload to an endpoint path.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`]; also fails if the payload cannot be
    /// represented as JSON.
    pub async fn post<T: Serialize>(&self, path: &str, payload: &T) -> Result<Response> {
        let request = self.request(Method::Post, path)?.json(payload)?.build();
        self.execute(request).await
    }

    /// PUT a JSON payload to an endpoint path.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn put<T: Serialize>(&self, path: &str, payload: &T) -> Result<Response> {
        let request = self.request(Method::Put, path)?.json(payload)?.build();
        self.execute(request).await
    }

    /// PATCH an endpoint path with a JSON payload.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn patch<T: Serialize>(&self, path: &str, payload: &T) -> Result<Response> {
        let request = self.request(Method::Patch, path)?.json(payload)?.build();
        self.execute(request).await
    }

    /// DELETE an endpoint path.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn delete(&self, path: &str) -> Result<Response> {
        let request = self.request(Method::Delete, path)?.build();
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let client = ApiClient::new("https://api.example.com").expect("client");
        assert_eq!(client.base_url().as_str(), "https://api.example.com/");
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = ApiClient::new("not a url").expect_err("should fail");
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn rejects_opaque_base_url() {
        let err = ApiClient::new("mailto:joe@example.com").expect_err("should fail");
        assert!(err.is_configuration());
    }

    #[test]
    fn rejects_blank_token() {
        let err = ApiClient::builder("https://api.example.com")
            .credentials(Credentials::token("  "))
            .build()
            .expect_err("should fail");
        assert!(err.is_configuration());
    }

    #[test]
    fn rejects_blank_basic_login() {
        let err = ApiClient::builder("https://api.example.com")
            .credentials(Credentials::basic("", "secret"))
            .build()
            .expect_err("should fail");
        assert!(err.is_configuration());
    }

    #[test]
    fn credentials_debug_redacts_secrets() {
        let basic = Credentials::basic("joe", "hunter2");
        let rendered = format!("{basic:?}");
        assert!(rendered.contains("joe"));
        assert!(!rendered.contains("hunter2"));

        let token = Credentials::token("ghp_secret");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("ghp_secret"));
    }

    #[test]
    fn request_builder_resolves_paths() {
        let client = ApiClient::new("https://api.example.com").expect("client");
        let request = client
            .request(Method::Get, "users/octocat")
            .expect("resolve")
            .query("page", "1")
            .build();

        assert_eq!(
            request.url().as_str(),
            "https://api.example.com/users/octocat?page=1"
        );
    }
}
