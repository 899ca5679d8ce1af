//! # Broadside
//!
//! A line-oriented, bidirectional protocol for two-player battleship
//! over TCP, in the tradition of SMTP/FTP-style text protocols: numeric
//! response codes, textual commands, a version handshake, and a
//! connection-scoped state machine.
//!
//! Either peer may send a command at any time; the engine keeps the
//! exchange ordered through a single outstanding-wait correlation slot
//! and a strict receive-order dispatch loop.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use broadside::{Board, Coordinate, Orientation, Peer, Player, Settings, ShipKind};
//!
//! # async fn run() -> Result<(), broadside::BroadsideError> {
//! let mut board = Board::new();
//! board.place_ship(ShipKind::Carrier, Coordinate::parse("A1")?, Orientation::Across)?;
//! // ... place the rest of the fleet ...
//!
//! let guest = Peer::connect(
//!     Settings::for_addr("127.0.0.1:7870"),
//!     board,
//!     Player::new("Alice")?,
//! )
//! .await?;
//! guest.start().await?;
//! let report = guest.fire(Coordinate::parse("B7")?).await?;
//! println!("B7: {:?}", report.result);
//! # Ok(())
//! # }
//! ```

mod error;
mod peer;

pub use error::BroadsideError;
pub use peer::{Hosting, Peer, ShotReport, ShotResult};

pub use broadside_engine::{
    CommandFault, CommandHandler, CommandRegistry, Connection,
    ConnectionState, EngineError, PacketObserver, Reply, Role,
    TraceObserver,
};
pub use broadside_game::{
    Battle, Board, Coordinate, GameError, Orientation, Player, ShipKind,
    ShotOutcome,
};
pub use broadside_protocol::{
    Packet, ProtocolError, ResponseCode, PROTOCOL_VERSION,
};
pub use broadside_transport::{Settings, TextEncoding, TransportError};
