//! Error types for link parsing, configuration, and persistence

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Link Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Link parse error: {0}")]
    Parse(#[from] ParseError),

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("SDK credentials are not configured (partner id and token required)")]
    NotConfigured,

    // ─────────────────────────────────────────────────────────────
    // Attribution Persistence Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Attribution persistence error: {message}")]
    Persistence { message: String },

    // ─────────────────────────────────────────────────────────────
    // Channel/Communication Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Channel closed unexpectedly")]
    ChannelClosed,
}

/// Reasons an inbound link cannot be resolved.
///
/// None of these are surfaced to the user. A link that fails to parse is
/// dropped by the router; `MalformedEncoding` is recovered inside the parser
/// by falling back to the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("not a valid URI: {0}")]
    InvalidUri(String),

    #[error("unsupported scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    #[error("unsupported host: {}", host.as_deref().unwrap_or("<none>"))]
    UnsupportedHost { host: Option<String> },

    #[error("malformed percent-encoding in: {raw}")]
    MalformedEncoding { raw: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Parse(_) | Error::Persistence { .. } | Error::NotConfigured
        )
    }

    /// Check if this error should stop the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ChannelClosed)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::config("bad poll interval");
        assert_eq!(err.to_string(), "Configuration error: bad poll interval");

        let err = Error::NotConfigured;
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_parse_error() {
        let err: Error = ParseError::UnsupportedScheme {
            scheme: "https".into(),
        }
        .into();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().contains("https"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_error_is_fatal() {
        assert!(Error::ChannelClosed.is_fatal());
        assert!(!Error::NotConfigured.is_fatal());
        assert!(!Error::persistence("disk full").is_fatal());
    }

    #[test]
    fn test_error_is_recoverable() {
        assert!(Error::persistence("disk full").is_recoverable());
        assert!(Error::NotConfigured.is_recoverable());
        assert!(!Error::ChannelClosed.is_recoverable());
    }

    #[test]
    fn test_unsupported_host_display() {
        let err = ParseError::UnsupportedHost { host: None };
        assert_eq!(err.to_string(), "unsupported host: <none>");

        let err = ParseError::UnsupportedHost {
            host: Some("other".into()),
        };
        assert_eq!(err.to_string(), "unsupported host: other");
    }

    #[test]
    fn test_context_preserves_error() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = result.context("writing attribution").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
