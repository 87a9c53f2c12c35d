//! Error types for the API client.

use std::fmt;
use std::path::PathBuf;

/// Failure kind derived from a non-success HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// HTTP 400.
    BadRequest,
    /// HTTP 401.
    BadApiKey,
    /// HTTP 404.
    NotFound,
    /// HTTP 405.
    BadMethod,
    /// Any HTTP 5xx (or higher).
    InternalServerError,
    /// Any other non-success status, e.g. 402, 403 or 429.
    Unclassified,
}

impl ApiErrorKind {
    /// Classifies a non-success status code. Total over `u16`; callers are
    /// expected to have already ruled out 2xx.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::BadApiKey,
            404 => Self::NotFound,
            405 => Self::BadMethod,
            s if s >= 500 => Self::InternalServerError,
            _ => Self::Unclassified,
        }
    }

    /// Name used when rendering the error.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BadRequest => "BadRequest",
            Self::BadApiKey => "BadApiKey",
            Self::NotFound => "NotFound",
            Self::BadMethod => "BadMethod",
            Self::InternalServerError => "InternalServerError",
            Self::Unclassified => "UnclassifiedApiError",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A failed remote call: the classified kind, the status code, and the
/// response text exactly as the server sent it.
///
/// Renders as `"<KindName>: <message> <status_code>"`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message} {status_code}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status_code: u16,
    pub message: String,
}

impl ApiError {
    /// Builds an error for `status_code`, classifying it with
    /// [`ApiErrorKind::from_status`].
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::from_status(status_code),
            status_code,
            message: message.into(),
        }
    }
}

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The API answered with a non-success status.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The request never produced a response (connection, TLS, timeout).
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// The file passed for upload could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A success response did not carry valid JSON.
    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The configured host or endpoint path does not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The API key contains characters not allowed in an HTTP header.
    #[error("API key is not a valid header value")]
    InvalidApiKey,
}

impl Error {
    /// Returns the classified API error, if this is one.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}
