//! Connection engine for Broadside.
//!
//! This crate is the single point of I/O for one protocol connection:
//!
//! - **[`Connection`]** — owns the socket, runs the background receive
//!   loop, serializes writes, and correlates commands with responses
//!   through the single outstanding-wait slot.
//! - **[`CommandRegistry`] / [`CommandHandler`]** — the verb-keyed
//!   dispatch table the receive loop consults for every incoming command.
//! - **[`ConnectionState`]** — the per-connection lifecycle state machine
//!   (Handshake → Idle → InGame → Disconnected).
//! - **[`PacketObserver`]** — read-only fan-out over everything the
//!   receive loop sees, for error forwarding and disconnect detection.
//!
//! # Concurrency model
//!
//! One background task per connection runs the receive loop; packets are
//! processed in strict receipt order and handlers never run concurrently
//! with each other. All other operations run on caller tasks and
//! synchronize with the loop through two narrow points: the write lock
//! (one line on the wire at a time) and the outstanding-wait slot (at
//! most one `expect_response` in flight — a second concurrent wait is a
//! usage fault, not a queue).

mod connection;
mod error;
mod handler;
mod observer;
mod state;

pub use connection::{Connection, Reply};
pub use error::EngineError;
pub use handler::{CommandFault, CommandHandler, CommandRegistry, HandlerFuture};
pub use observer::{PacketObserver, TraceObserver};
pub use state::ConnectionState;

use std::fmt;

/// The lifecycle verb driving the disconnect handshake. Owned by the
/// engine; game crates register their closing handler under it.
pub const QUIT_VERB: &str = "QUIT";

/// Which side of the connection this peer is.
///
/// Fixed at construction. The role drives the protocol's deliberate
/// asymmetries: the host sends the greeting and never initiates HELLO or
/// START, and the two sides close differently (see
/// [`Connection::disconnect`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Accepted the connection; authoritative for the closing signal.
    Host,

    /// Dialed in; initiates HELLO, START, and QUIT.
    Guest,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Guest => write!(f, "guest"),
        }
    }
}
