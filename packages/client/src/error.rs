//! Client-side error definitions.

use thiserror::Error;

/// Errors raised by the CLI client session.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failed to establish the WebSocket connection
    #[error("failed to connect to server: {0}")]
    ConnectionError(String),

    /// The connection dropped while the session was running
    #[error("connection lost")]
    ConnectionLost,

    /// The server closed the stream before sending the connected ack
    #[error("server did not acknowledge the connection")]
    MissingAck,
}
