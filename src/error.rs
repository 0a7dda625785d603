//! Error types for the NTLM request executor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// NTLM request executor errors.
#[derive(Error, Debug)]
pub enum NtlmError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("NTLM authentication failed: {0}")]
    Authentication(String),

    #[error("Failed to read response body: {0}")]
    ResponseRead(#[source] reqwest::Error),
}

impl NtlmError {
    /// Classify this error into one of the three failure kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::ClientBuild(_) => ErrorKind::Construction,
            Self::Transport(_) | Self::Authentication(_) => ErrorKind::Transport,
            Self::ResponseRead(_) => ErrorKind::ResponseRead,
        }
    }
}

/// Broad failure classes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed URL or invalid request parameters
    Construction,
    /// Connection, TLS, or NTLM challenge-response failure
    Transport,
    /// Failure while draining the response body
    ResponseRead,
}

impl ErrorKind {
    /// Get the string code for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Construction => "CONSTRUCTION",
            Self::Transport => "TRANSPORT",
            Self::ResponseRead => "RESPONSE_READ",
        }
    }
}

pub type Result<T> = std::result::Result<T, NtlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_as_str() {
        assert_eq!(ErrorKind::Construction.as_str(), "CONSTRUCTION");
        assert_eq!(ErrorKind::Transport.as_str(), "TRANSPORT");
        assert_eq!(ErrorKind::ResponseRead.as_str(), "RESPONSE_READ");
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            NtlmError::InvalidRequest("empty URL".into()).kind(),
            ErrorKind::Construction
        );
        assert_eq!(
            NtlmError::InvalidArgument("url must be a string".into()).kind(),
            ErrorKind::Construction
        );
        assert_eq!(NtlmError::Config("zero timeout".into()).kind(), ErrorKind::Construction);
    }

    #[test]
    fn test_authentication_is_transport_kind() {
        let err = NtlmError::Authentication("credentials rejected".into());
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "NTLM authentication failed: credentials rejected");
    }
}
