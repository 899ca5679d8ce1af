//! Game layer for Broadside: the collaborators the protocol engine
//! consumes through narrow interfaces.
//!
//! - **[`Board`]** — grid occupancy, shot records, and sinking logic.
//! - **[`Player`]** — identity and endpoint metadata.
//! - **[`Battle`]** — the per-connection game table shared between the
//!   command handlers and the orchestrator: opponent identity, own
//!   fleet, and whose turn it is.
//! - **handlers** — the concrete command set (HELLO, START, FIRE, QUIT,
//!   HELP), each a [`CommandHandler`](broadside_engine::CommandHandler)
//!   registered with the engine's dispatch table.
//!
//! The engine knows nothing about any of this; it routes verbs. This
//! crate decides what the verbs mean.

mod battle;
mod board;
mod coord;
mod error;
pub mod handlers;
mod player;

pub use battle::{Battle, SharedBattle};
pub use board::{Board, Orientation, ShipKind, ShotOutcome};
pub use coord::Coordinate;
pub use error::GameError;
pub use player::Player;
