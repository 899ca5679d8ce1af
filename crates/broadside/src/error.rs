//! Unified error type for the Broadside meta-crate.

use broadside_engine::{ConnectionState, EngineError};
use broadside_game::GameError;
use broadside_protocol::{ProtocolError, ResponseCode};
use broadside_transport::TransportError;

/// Top-level error wrapping the layer-specific errors, plus the usage
/// faults raised by the [`Peer`](crate::Peer) orchestrator itself.
///
/// The `#[from]` variants let `?` convert sub-crate errors
/// automatically, keeping the original as the chained cause.
#[derive(Debug, thiserror::Error)]
pub enum BroadsideError {
    /// A transport-level error (connect, accept, read, write).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (parse, packet construction, version).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A connection-engine error (correlation, state machine, dispatch).
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A game-layer error (board, coordinates, identity).
    #[error(transparent)]
    Game(#[from] GameError),

    /// A locally initiated operation is not legal in the current
    /// connection state. Nothing was sent.
    #[error("operation not valid while {state}")]
    WrongState {
        /// The state the connection was in.
        state: ConnectionState,
    },

    /// A shot was attempted out of turn. Nothing was sent.
    #[error("it is not your turn")]
    NotYourTurn,

    /// Only the non-hosting peer may initiate START.
    #[error("the host cannot start the game")]
    HostCannotStart,

    /// The peer answered FIRE with an error code.
    #[error("shot rejected with {code}: {}", .message.as_deref().unwrap_or("no detail"))]
    FireRejected {
        /// The 4xx code the peer replied with.
        code: ResponseCode,
        /// The message that came with it.
        message: Option<String>,
    },
}
