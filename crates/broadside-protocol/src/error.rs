//! Error types for the protocol layer.
//!
//! Everything here is a syntax-level fault: the line (or the fields used
//! to build one) does not form a valid packet. Sequencing and transport
//! problems live in the engine and transport crates respectively.

/// Errors that can occur while parsing or constructing a packet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// An empty (or whitespace-only) line was received.
    #[error("empty line")]
    EmptyLine,

    /// A command verb was empty or contained characters outside
    /// `[A-Za-z][A-Za-z0-9]*`.
    #[error("invalid command verb {0:?}")]
    InvalidVerb(String),

    /// A response line started with a numeric token that does not fit a
    /// response code.
    #[error("malformed response code {0:?}")]
    MalformedCode(String),

    /// A response carried a numeric code outside the fixed enumeration.
    #[error("unknown response code {0}")]
    UnknownCode(u16),

    /// An argument or message contained a line terminator, which would
    /// break the one-packet-per-line framing.
    #[error("line terminator in packet field")]
    IllegalCharacter,

    /// The greeting carried a missing or non-matching version string.
    #[error("protocol version mismatch: got {got:?}")]
    VersionMismatch {
        /// The version string the peer sent (possibly empty).
        got: String,
    },
}
