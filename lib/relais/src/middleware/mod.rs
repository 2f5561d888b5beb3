//! Tower middleware layers for the relais pipeline.
//!
//! Every layer here is a stage in the onion: it may inspect or mutate the
//! envelope's request before delegating to its inner stage, and inspect or
//! mutate the response after the inner stage returns. Layers hold only
//! immutable construction-time configuration, so a composed pipeline can be
//! traversed concurrently.
//!
//! # Available Layers
//!
//! - [`BasicAuthLayer`] - Adds `Authorization: Basic <base64>` header
//! - [`TokenAuthLayer`] - Adds `Authorization: token <token>` header
//! - [`MetadataLayer`] - Extracts rate-limit/scope/link/etag metadata
//! - [`JsonCodecLayer`] - Serializes request payloads, parses reply bodies
//! - [`LoggingLayer`] - Logs requests/responses using `tracing`
//!
//! Composition order is significant: the first registered layer shapes the
//! request first and sees the response last. The conventional chain is
//! auth, then metadata, then the JSON codec, around a (possibly caching)
//! transport.

mod basic_auth;
mod json;
mod logging;
mod metadata;
mod token_auth;

pub use basic_auth::{BasicAuth, BasicAuthLayer};
pub use json::{JsonCodec, JsonCodecLayer};
pub use logging::{LogLevel, Logging, LoggingLayer};
pub use metadata::{Metadata, MetadataLayer};
pub use token_auth::{TokenAuth, TokenAuthLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
