//! HTTP response handling.
//!
//! [`Response`] carries the raw reply plus two side channels that pipeline
//! middleware populates: the parsed JSON document (JSON codec) and the
//! extracted [`ApiInfo`] metadata (metadata middleware). Each slot has
//! exactly one writer, which keeps the raw and deserialized bodies
//! consistent by construction.

use bytes::Bytes;

use crate::{ApiInfo, HeaderMap, Result};

/// HTTP response with status, headers, raw body, and middleware-populated
/// side channels.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
    document: Option<serde_json::Value>,
    api_info: Option<ApiInfo>,
}

impl Response {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
            document: None,
            api_info: None,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Raw response body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Parsed JSON document, if the codec middleware produced one.
    #[must_use]
    pub const fn document(&self) -> Option<&serde_json::Value> {
        self.document.as_ref()
    }

    /// Attach the parsed JSON document. Called by the codec middleware only;
    /// the document must be derived from the raw body.
    pub fn set_document(&mut self, document: serde_json::Value) {
        self.document = Some(document);
    }

    /// Extracted response metadata, if the metadata middleware ran.
    #[must_use]
    pub const fn api_info(&self) -> Option<&ApiInfo> {
        self.api_info.as_ref()
    }

    /// Attach extracted metadata. Called by the metadata middleware only.
    pub fn set_api_info(&mut self, api_info: ApiInfo) {
        self.api_info = Some(api_info);
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 304 Not Modified.
    #[must_use]
    pub const fn is_not_modified(&self) -> bool {
        self.status == 304
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Deserialize the response into the caller's target type.
    ///
    /// Uses the document parsed by the codec middleware when present, and
    /// falls back to parsing the raw body. An empty body yields
    /// `T::default()`: several endpoints legitimately answer with no
    /// content.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn typed<T>(&self) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        match &self.document {
            Some(document) => {
                serde_path_to_error::deserialize(document.clone()).map_err(|e| {
                    crate::Error::json_deserialization(
                        e.path().to_string(),
                        e.inner().to_string(),
                    )
                })
            }
            None if self.body.is_empty() => Ok(T::default()),
            None => crate::from_json(&self.body),
        }
    }

    /// Get the response body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> std::result::Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (u16, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}
