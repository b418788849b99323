//! Error types for rule parsing, configuration validation, and sessions
//!
//! Lookup misses are not errors anywhere in this crate; they come back as
//! `Option`/`bool`. The types here cover the genuinely failable paths:
//! malformed rule strings, invalid configuration values, and session
//! termination reasons.

use thiserror::Error;

/// Errors produced while parsing a single mapping or bypass rule string.
///
/// A bad rule never aborts a whole configuration load: the bulk entry
/// points log the error and keep going with the remaining rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RuleParseError {
    #[error("rule is empty")]
    Empty,

    #[error("expected {expected} tokens, got {actual}")]
    TokenCount { expected: usize, actual: usize },

    #[error("unknown rule keyword: {0}")]
    UnknownKeyword(String),

    #[error("invalid host:port: {0}")]
    InvalidHostPort(String),

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("invalid CIDR block: {0}")]
    InvalidCidr(String),

    #[error("invalid scheme prefix: {0}")]
    InvalidScheme(String),

    #[error("hostname pattern is empty")]
    EmptyHostnamePattern,
}

/// Validation errors for configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("max sessions per key must be at least 1")]
    ZeroSessionCap,
}

/// Terminal status of a pooled session.
///
/// These mirror the network-error codes the transport layer reports; the
/// pool itself only ever closes sessions with [`SessionError::Aborted`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The session was torn down by the pool (shutdown, network change,
    /// or TLS configuration change).
    #[error("session aborted")]
    Aborted,

    /// The server's certificate was not accepted for a secure session.
    #[error("certificate error: {0}")]
    CertificateError(String),

    /// The remote closed the underlying connection.
    #[error("connection closed")]
    ConnectionClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_parse_error_messages_name_the_offending_input() {
        let err = RuleParseError::InvalidCidr("10.0.0.0/99".to_string());
        assert!(err.to_string().contains("10.0.0.0/99"));

        let err = RuleParseError::UnknownKeyword("REWRITE".to_string());
        assert!(err.to_string().contains("REWRITE"));
    }

    #[test]
    fn session_error_display() {
        assert_eq!(SessionError::Aborted.to_string(), "session aborted");
        assert!(
            SessionError::CertificateError("self-signed".to_string())
                .to_string()
                .contains("self-signed")
        );
    }
}
