use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for keycred operations
pub type Result<T> = std::result::Result<T, KeyCredError>;

/// Errors that can occur while loading, packaging or uploading a signing key
#[derive(Error, Debug)]
pub enum KeyCredError {
    /// The PFX or CER file is missing, malformed, or the passphrase is wrong
    #[error("failed to load certificate from {path}: {reason}")]
    CertificateLoad {
        /// File the failure relates to
        path: String,
        /// What went wrong
        reason: String,
    },

    /// Certificate bytes could not be read or encoded into the payload
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The certificate validity window cannot back a credential
    #[error("invalid validity window ({kind}): notBefore {not_before}, notAfter {not_after}")]
    ValidityWindow {
        /// Why the window was rejected
        kind: WindowProblem,
        /// Certificate notBefore
        not_before: DateTime<Utc>,
        /// Certificate notAfter
        not_after: DateTime<Utc>,
    },

    /// A Graph or discovery request failed
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Self-signed certificate generation failed
    #[error("certificate generation failed: {0}")]
    Generate(String),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error outside certificate loading
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File the failure relates to
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl KeyCredError {
    /// Build a certificate load error for a path.
    pub fn load(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::CertificateLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build an I/O error for a path.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the upload error if this is one
    #[must_use]
    pub const fn as_upload(&self) -> Option<&UploadError> {
        match self {
            Self::Upload(e) => Some(e),
            _ => None,
        }
    }
}

/// Reason a validity window was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowProblem {
    /// notAfter is not after notBefore
    Inverted,
    /// notAfter is already in the past
    Expired,
}

impl std::fmt::Display for WindowProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inverted => write!(f, "notAfter is not after notBefore"),
            Self::Expired => write!(f, "certificate has expired"),
        }
    }
}

/// Failures of a single Graph or discovery exchange.
///
/// None of these are retried. A [`UploadError::Timeout`] leaves the outcome of a
/// mutating request unknown: fetch the resource again before deciding to retry.
#[derive(Error, Debug)]
pub enum UploadError {
    /// No response within the configured timeout
    #[error("request timed out after {0} seconds; outcome unknown, re-check the service principal before retrying")]
    Timeout(u64),

    /// Graph rejected the request (4xx)
    #[error("request rejected ({status}{}): {message}", code_suffix(.code.as_deref()))]
    Http4xx {
        /// HTTP status code
        status: u16,
        /// Graph error code, e.g. `Authorization_RequestDenied`
        code: Option<String>,
        /// Error message from the server
        message: String,
    },

    /// Graph failed to process the request (5xx)
    #[error("server error ({status}{}): {message}", code_suffix(.code.as_deref()))]
    Http5xx {
        /// HTTP status code
        status: u16,
        /// Graph error code
        code: Option<String>,
        /// Error message from the server
        message: String,
    },

    /// The request never reached the server
    #[error("connection failed: {0}")]
    Connection(String),
}

fn code_suffix(code: Option<&str>) -> String {
    code.map(|c| format!(", {c}")).unwrap_or_default()
}

/// Subkind of an [`UploadError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadErrorKind {
    /// Request timed out
    Timeout,
    /// 4xx response
    Http4xx,
    /// 5xx response
    Http5xx,
    /// Transport failure before a response
    Connection,
}

impl UploadError {
    /// Classify an error response by status code.
    #[must_use]
    pub fn from_status(status: u16, code: Option<String>, message: String) -> Self {
        if status >= 500 {
            Self::Http5xx {
                status,
                code,
                message,
            }
        } else {
            Self::Http4xx {
                status,
                code,
                message,
            }
        }
    }

    /// Returns the subkind of this error
    #[must_use]
    pub const fn kind(&self) -> UploadErrorKind {
        match self {
            Self::Timeout(_) => UploadErrorKind::Timeout,
            Self::Http4xx { .. } => UploadErrorKind::Http4xx,
            Self::Http5xx { .. } => UploadErrorKind::Http5xx,
            Self::Connection(_) => UploadErrorKind::Connection,
        }
    }

    /// Returns true if the server may have applied the request
    #[must_use]
    pub const fn outcome_unknown(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Http5xx { .. })
    }

    /// Returns the HTTP status code if a response was received
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http4xx { status, .. } | Self::Http5xx { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the server-provided message, if any
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Http4xx { message, .. } | Self::Http5xx { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let err = UploadError::from_status(403, None, "denied".into());
        assert_eq!(err.kind(), UploadErrorKind::Http4xx);
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.server_message(), Some("denied"));
        assert!(!err.outcome_unknown());

        let err = UploadError::from_status(503, None, "busy".into());
        assert_eq!(err.kind(), UploadErrorKind::Http5xx);
        assert!(err.outcome_unknown());
    }

    #[test]
    fn test_timeout_is_unknown_outcome() {
        let err = UploadError::Timeout(30);
        assert_eq!(err.kind(), UploadErrorKind::Timeout);
        assert!(err.outcome_unknown());
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_message_carries_graph_code() {
        let err = UploadError::from_status(
            400,
            Some("Request_BadRequest".into()),
            "Invalid property 'keyCredential'.".into(),
        );
        assert_eq!(
            err.to_string(),
            "request rejected (400, Request_BadRequest): Invalid property 'keyCredential'."
        );
    }

    #[test]
    fn test_upload_wraps_transparently() {
        let err: KeyCredError = UploadError::Connection("refused".into()).into();
        assert_eq!(err.to_string(), "connection failed: refused");
        assert!(err.as_upload().is_some());
    }
}
