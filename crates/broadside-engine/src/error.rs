//! Error types for the connection engine.
//!
//! The variants fall into the protocol's fault taxonomy:
//!
//! - syntax faults: [`EngineError::Protocol`], [`EngineError::UnknownCommand`]
//! - sequence faults: [`EngineError::UnsolicitedResponse`],
//!   [`EngineError::UnexpectedResponse`]
//! - usage faults (caller bugs, never sent to the peer):
//!   [`EngineError::WaitAlreadyPending`], [`EngineError::IllegalTransition`],
//!   [`EngineError::AlreadyDisconnected`], [`EngineError::AlreadyListening`],
//!   [`EngineError::DuplicateVerb`]
//! - transport faults: [`EngineError::Transport`] — always terminal for
//!   the connection.

use std::time::Duration;

use broadside_protocol::{ProtocolError, ResponseCode};
use broadside_transport::TransportError;

use crate::ConnectionState;

/// Errors surfaced by the connection engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The underlying stream failed; the native error detail is kept as
    /// the source.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A line could not be parsed, or a packet could not be built.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A command arrived whose verb has no registered handler.
    #[error("unknown command {0}")]
    UnknownCommand(String),

    /// An awaited response did not arrive within the bound.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The connection completed while an operation was pending, or an
    /// operation was attempted after completion.
    #[error("connection closed")]
    ConnectionClosed,

    /// `expect_response` was called while another wait was outstanding.
    #[error("a response wait is already outstanding")]
    WaitAlreadyPending,

    /// A response arrived with no outstanding wait to deliver it to.
    #[error("received response {code} with no outstanding wait")]
    UnsolicitedResponse {
        /// The code of the discarded response.
        code: ResponseCode,
    },

    /// `ensure_response` received a response with the wrong code.
    #[error("expected response {expected}, got {actual}")]
    UnexpectedResponse {
        /// The code the caller insisted on.
        expected: ResponseCode,
        /// The code that actually arrived.
        actual: ResponseCode,
        /// The message that came with it, for diagnostics.
        message: Option<String>,
    },

    /// A state transition outside the legal table was requested.
    #[error("illegal state transition {from} -> {to}")]
    IllegalTransition {
        /// State before the attempt.
        from: ConnectionState,
        /// Requested target state.
        to: ConnectionState,
    },

    /// `disconnect` was called on an already-disconnected connection.
    #[error("connection already disconnected")]
    AlreadyDisconnected,

    /// `begin_listening` was called twice.
    #[error("receive loop already started")]
    AlreadyListening,

    /// Two handlers were registered under the same verb.
    #[error("duplicate command verb {0}")]
    DuplicateVerb(String),
}
