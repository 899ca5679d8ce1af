use std::time::Duration;

/// Errors that can occur in the transport layer.
///
/// I/O variants keep the underlying `std::io::Error` as their source so
/// platform-native detail survives into diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listening socket failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// Connecting to the remote peer failed.
    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),

    /// Accepting an incoming connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// Reading from the stream failed.
    #[error("read failed: {0}")]
    Read(#[source] std::io::Error),

    /// Writing to the stream failed.
    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),

    /// Received (or asked to send) bytes that are invalid for the
    /// configured text encoding. Unrecoverable for the connection.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Connecting or accepting did not finish within the configured bound.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}
