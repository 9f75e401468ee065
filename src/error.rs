//! Error types for the bot engine.
//!
//! This module defines error types for framing failures, record parsing,
//! mode-string parsing and connection lifecycle.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Framing-level errors raised while turning bytes into records.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A record (or an unterminated tail) exceeded the line limit.
    #[error("message too long: {actual} bytes (limit {limit})")]
    MessageTooLong {
        /// Observed length in bytes.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },
}

/// Errors encountered when parsing a single record.
///
/// Any of these means the record is malformed: it is dropped and no event
/// is emitted for it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Record was empty (or whitespace only).
    #[error("empty message")]
    EmptyMessage,

    /// No action token could be extracted.
    #[error("missing command in record: {0:?}")]
    MissingCommand(String),

    /// The prefix marker was present but the prefix itself was empty.
    #[error("invalid prefix: {0:?}")]
    InvalidPrefix(String),
}

/// Errors encountered when parsing MODE change strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModeParseError {
    /// A run did not start with `+` or `-`.
    #[error("missing mode modifier")]
    MissingModeModifier,

    /// A sign was not followed by any flag character.
    #[error("empty mode run after {sign:?}")]
    EmptyModeRun {
        /// The dangling sign.
        sign: char,
    },

    /// Runs and target users cannot be paired one to one.
    #[error("mode runs do not match targets: {runs} runs, {targets} targets")]
    TargetCountMismatch {
        /// Number of sign-prefixed runs.
        runs: usize,
        /// Number of target users supplied.
        targets: usize,
    },
}

/// Errors that end or prevent a server session.
#[cfg(feature = "tokio")]
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectionError {
    /// Socket-level failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Framing failure on the read side.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The configured host is not a valid TLS server name.
    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    /// TLS was requested but no client configuration was supplied.
    #[error("tls requested for {0} without a client config")]
    MissingTlsConfig(String),

    /// Nothing arrived within the idle timeout.
    #[error("idle timeout after {0:?}")]
    IdleTimeout(std::time::Duration),

    /// The server sent ERROR and closed the link.
    #[error("server error: {0}")]
    ServerError(String),

    /// The session task ended without reporting a result.
    #[error("connection closed")]
    Closed,

    /// No connection is registered under that name.
    #[error("unknown connection: {0}")]
    UnknownConnection(String),

    /// A connection with that name is already live.
    #[error("connection already exists: {0}")]
    DuplicateConnection(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::MessageTooLong {
            actual: 9000,
            limit: 8191,
        };
        assert_eq!(format!("{}", err), "message too long: 9000 bytes (limit 8191)");

        let err = ModeParseError::TargetCountMismatch { runs: 2, targets: 1 };
        assert_eq!(
            format!("{}", err),
            "mode runs do not match targets: 2 runs, 1 targets"
        );
    }

    #[test]
    fn test_error_conversion() {
        let io_err =
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let protocol_err: ProtocolError = io_err.into();

        match protocol_err {
            ProtocolError::Io(_) => {}
            _ => panic!("Expected Io variant"),
        }
    }

    #[cfg(feature = "tokio")]
    #[test]
    fn test_connection_error_source_chaining() {
        let inner = ProtocolError::MessageTooLong {
            actual: 10,
            limit: 5,
        };
        let err: ConnectionError = inner.into();
        let source = std::error::Error::source(&err);
        assert_eq!(source.unwrap().to_string(), "message too long: 10 bytes (limit 5)");
        assert!(err.to_string().starts_with("protocol error"));
    }
}
