//! Error types for wordgrid-client.

use thiserror::Error;

use crate::protocol::Opcode;

/// Main error type for all client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// I/O error on the TCP socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protobuf body of a response could not be decoded.
    #[error("Payload decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// JSON error while loading configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed frame or broadcast. Fatal for the connection.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The server answered the call with `success == false`.
    #[error("{operation} failed")]
    Rpc { operation: Opcode },

    /// A successful response lacked a field the operation returns.
    #[error("{operation} response is missing `{field}`")]
    MissingField {
        operation: Opcode,
        field: &'static str,
    },

    /// The connection is gone; pending and new calls fail with this.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The caller abandoned the call before its response arrived.
    #[error("{operation} cancelled")]
    Cancelled { operation: Opcode },

    /// No response within the configured request timeout.
    #[error("{operation} timed out")]
    Timeout { operation: Opcode },

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),
}

impl ClientError {
    /// Check whether this error means the connection itself is unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClientError::Protocol(_) | ClientError::ConnectionClosed | ClientError::Io(_)
        )
    }
}

/// Result type alias using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_names_operation() {
        let err = ClientError::Rpc {
            operation: Opcode::JoinLobby,
        };
        assert_eq!(err.to_string(), "JoinLobby failed");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_fatal_classification() {
        assert!(ClientError::ConnectionClosed.is_fatal());
        assert!(ClientError::Protocol("bad".into()).is_fatal());
        assert!(!ClientError::Timeout {
            operation: Opcode::Heartbeat
        }
        .is_fatal());
    }
}
