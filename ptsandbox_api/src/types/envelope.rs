//! The request envelope handed to [`Client::send_request`](crate::Client::send_request).

use reqwest::header::HeaderMap;
use serde::Serialize;

/// Payload of a single request. At most one kind of body is ever attached.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Sent JSON-encoded.
    Json(serde_json::Value),
    /// Sent as-is.
    Raw(Vec<u8>),
}

/// Everything needed to issue one POST: path relative to the API root, the
/// headers for this request only, and the body.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    pub relative_path: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl RequestEnvelope {
    /// Creates an envelope with no body.
    pub fn new(relative_path: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            relative_path: relative_path.into(),
            headers,
            body: RequestBody::Empty,
        }
    }

    /// Attaches `body` serialized to JSON, replacing any previous body.
    pub fn with_json<T: Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attaches raw bytes, replacing any previous body.
    pub fn with_raw(mut self, bytes: Vec<u8>) -> Self {
        self.body = RequestBody::Raw(bytes);
        self
    }
}
