//! Core types and traits for the relais HTTP request pipeline.
//!
//! This crate provides the transport-free foundation used by relais:
//! - [`Method`] - HTTP method enum
//! - [`HeaderMap`] - case-insensitive header map
//! - [`Request`] and [`RequestBuilder`] - HTTP request types
//! - [`Body`] - request payload, before or after serialization
//! - [`Response`] - HTTP response type with metadata side channels
//! - [`ApiInfo`] - structured metadata extracted from response headers
//! - [`Envelope`] - per-call request/response pair traversing the pipeline
//! - [`Error`] and [`Result`] - Error handling
//! - [`Transport`] - the network seam terminating a pipeline

mod api_info;
mod body;
mod envelope;
mod error;
mod headers;
mod method;
mod request;
mod response;
mod transport;

pub use api_info::ApiInfo;
pub use body::{Body, from_json, to_json};
pub use envelope::Envelope;
pub use error::{Error, Result};
pub use headers::HeaderMap;
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use transport::Transport;

// Re-export http crate types for status codes and header names
pub use http::{StatusCode, header};
