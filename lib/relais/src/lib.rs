//! Typed HTTP/JSON API client with a composable middleware pipeline.
//!
//! Requests flow through an onion of tower layers (authentication,
//! metadata extraction, JSON codec) terminating in a pooled TLS transport,
//! optionally decorated with a transparent conditional-GET cache.
//!
//! # Example
//!
//! ```no_run
//! use relais::prelude::*;
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct User {
//!     id: u64,
//!     login: String,
//! }
//!
//! # async fn example() -> relais::Result<()> {
//! let client = ApiClient::builder("https://api.github.com")
//!     .credentials(Credentials::token("ghp_…"))
//!     .cached()
//!     .build()?;
//!
//! let response = client.get("users/octocat").await?;
//! let user: User = response.typed()?;
//! # Ok(())
//! # }
//! ```
//!
//! For custom stages, register any tower [`Layer`](middleware::Layer) over
//! [`pipeline::BoxedHandler`] on a [`pipeline::PipelineBuilder`] directly.

pub mod cache;
mod client;
mod config;
pub mod middleware;
pub mod pipeline;
pub mod prelude;
mod transport;

// Re-export client types
pub use client::{ApiClient, ApiClientBuilder, Credentials};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use transport::HyperTransport;

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use relais_core::{
    ApiInfo, Body, Envelope, Error, HeaderMap, Method, Request, RequestBuilder, Response, Result,
    Transport, from_json, to_json,
};

// Re-export http types for status codes and headers
pub use relais_core::{StatusCode, header};

pub use url;
