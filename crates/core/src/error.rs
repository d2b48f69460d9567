//! Error types for mantle-core
//!
//! Provides a unified error type shared by the client trait and its
//! implementations. Remote failures keep their HTTP status so callers can
//! branch on it.

use thiserror::Error;

/// Result type alias for mantle-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for mantle-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Client configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid object path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Malformed path or payload encoding
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A recognized metadata header failed validation
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Remote object or directory not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation invalid for the object's kind, e.g. listing a plain object
    #[error("Not a directory: {0}")]
    ObjectType(String),

    /// Request signing or authentication failure
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Transport-level failure before a status code was received
    #[error("Network error: {0}")]
    Network(String),

    /// Remote request failed with a non-success status other than 404
    #[error("Request failed with status {status}: {body}")]
    RequestFailed {
        /// HTTP status code returned by the store
        status: u16,
        /// Response body text, if any
        body: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Map a non-success HTTP status to the matching error variant.
    ///
    /// 404 becomes [`Error::NotFound`] so callers can implement existence
    /// checks; 401/403 become [`Error::Auth`]; everything else keeps its
    /// status in [`Error::RequestFailed`].
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            404 => Error::NotFound(body),
            401 | 403 => Error::Auth(body),
            _ => Error::RequestFailed { status, body },
        }
    }

    /// Whether this error means the addressed object does not exist
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// The HTTP status code behind this error, if there is one
    pub const fn status(&self) -> Option<u16> {
        match self {
            Error::NotFound(_) => Some(404),
            Error::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_not_found() {
        let err = Error::from_status(404, "no such object");
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_from_status_auth() {
        assert!(matches!(Error::from_status(401, ""), Error::Auth(_)));
        assert!(matches!(Error::from_status(403, ""), Error::Auth(_)));
    }

    #[test]
    fn test_from_status_other() {
        let err = Error::from_status(503, "unavailable");
        assert!(!err.is_not_found());
        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_object_type_has_no_status() {
        let err = Error::ObjectType("/a/stor/file".into());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "Not a directory: /a/stor/file");
    }

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("/a/stor/missing".into());
        assert_eq!(err.to_string(), "Not found: /a/stor/missing");

        let err = Error::InvalidPath("relative/path".into());
        assert_eq!(err.to_string(), "Invalid path: relative/path");
    }
}
