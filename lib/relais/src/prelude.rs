//! Prelude module for convenient imports.
//!
//! Re-exports the most commonly used types for easy glob importing:
//!
//! ```
//! use relais::prelude::*;
//! ```

pub use crate::{
    ApiClient, ApiInfo, Body, ClientConfig, Credentials, Error, HeaderMap, Method, Request,
    RequestBuilder, Response, Result, StatusCode, Transport, from_json, header, to_json,
};
pub use serde::{Deserialize, Serialize};
