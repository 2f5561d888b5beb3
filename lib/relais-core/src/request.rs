//! HTTP request building.
//!
//! Use [`Request::endpoint`] to resolve a base address and a relative
//! endpoint path into an absolute URL, or [`Request::builder`] when an
//! absolute URL is already at hand.
//!
//! # Example
//!
//! ```
//! use relais_core::{Body, Method, Request};
//!
//! let base = url::Url::parse("https://api.example.com").unwrap();
//! let request = Request::endpoint(Method::Get, &base, "users/octocat")
//!     .unwrap()
//!     .header("Accept", "application/json")
//!     .query("page", "1")
//!     .build();
//! assert_eq!(request.url().as_str(), "https://api.example.com/users/octocat?page=1");
//! ```

use crate::{Body, HeaderMap, Method, Result};

/// An HTTP request with method, absolute URL, headers, and payload.
///
/// The URL is absolute by construction: [`Request::endpoint`] fails before
/// a relative path ever reaches the transport.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: url::Url,
    headers: HeaderMap,
    body: Body,
}

impl Request {
    /// Creates a new [`RequestBuilder`] from an absolute URL.
    #[must_use]
    pub fn builder(method: Method, url: url::Url) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    /// Creates a builder by resolving an endpoint path against a base URL.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidUrl`] if the path does not resolve.
    pub fn endpoint(method: Method, base: &url::Url, path: &str) -> Result<RequestBuilder> {
        let url = base.join(path)?;
        Ok(RequestBuilder::new(method, url))
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Request payload.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Replace the payload.
    pub fn set_body(&mut self, body: Body) {
        self.body = body;
    }

    /// The request identity used as a cache key: method + full URL, query
    /// string included. Headers do not participate (no vary support).
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, url::Url, HeaderMap, Body) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: url::Url,
    headers: HeaderMap,
    body: Body,
}

impl RequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Body::Empty,
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets multiple headers.
    #[must_use]
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Appends a query parameter to the URL.
    #[must_use]
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    /// Appends multiple query parameters to the URL.
    #[must_use]
    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        {
            let mut query = self.url.query_pairs_mut();
            for (name, value) in pairs {
                query.append_pair(&name, &value);
            }
        }
        self
    }

    /// Sets the request payload.
    #[must_use]
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a structured JSON payload, serialized later by the codec
    /// middleware.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn json<T: serde::Serialize>(self, value: &T) -> Result<Self> {
        let body = Body::json(value)?;
        Ok(self.body(body))
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}
