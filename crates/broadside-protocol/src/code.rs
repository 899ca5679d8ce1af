//! The fixed enumeration of numeric response codes.
//!
//! Codes are grouped by leading digit, analogous to SMTP:
//!
//! ```text
//! 1xx  preliminary     (version greeting)
//! 2xx  success         (acks and shot outcomes)
//! 4xx  client fault    (protocol or rule violation by the peer)
//! 5xx  unrecoverable   (internal failure)
//! ```
//!
//! The set is closed: a code received on the wire that is not in this
//! enumeration is a syntax fault, never silently ignored.

use std::fmt;

/// A numeric response code.
///
/// Each variant maps to a stable small integer via [`code()`](Self::code)
/// and back via [`from_code()`](Self::from_code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    /// `100` — sent by the host immediately after accepting a connection.
    /// The message carries the protocol version string.
    VersionGreeting,

    /// `200` — generic success; acknowledges HELLO and HELP.
    Ok,

    /// `201` — acknowledges START; play begins.
    GameStarted,

    /// `202` — a FIRE hit open water.
    Miss,

    /// `203` — a FIRE hit a ship.
    Hit,

    /// `204` — a FIRE hit the last intact cell of a ship. The message
    /// names the ship that went down.
    Sunk,

    /// `205` — a FIRE sank the last remaining ship. Game over.
    FleetSunk,

    /// `220` — acknowledges QUIT, or announces that the sender is
    /// closing the connection.
    ConnectionClosed,

    /// `400` — malformed line, unknown verb, or malformed handshake.
    SyntaxError,

    /// `401` — the command or response is not valid in the current
    /// connection state.
    SequenceError,

    /// `402` — a FIRE targeted a coordinate that was already shot.
    AlreadyShot,

    /// `403` — a FIRE arrived from the peer while it was not their turn.
    NotYourTurn,

    /// `500` — the receiver failed internally while handling a command.
    InternalError,
}

impl ResponseCode {
    /// The wire representation of this code.
    pub fn code(self) -> u16 {
        match self {
            Self::VersionGreeting => 100,
            Self::Ok => 200,
            Self::GameStarted => 201,
            Self::Miss => 202,
            Self::Hit => 203,
            Self::Sunk => 204,
            Self::FleetSunk => 205,
            Self::ConnectionClosed => 220,
            Self::SyntaxError => 400,
            Self::SequenceError => 401,
            Self::AlreadyShot => 402,
            Self::NotYourTurn => 403,
            Self::InternalError => 500,
        }
    }

    /// Maps a wire integer back to a code. Returns `None` for anything
    /// outside the fixed enumeration.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            100 => Some(Self::VersionGreeting),
            200 => Some(Self::Ok),
            201 => Some(Self::GameStarted),
            202 => Some(Self::Miss),
            203 => Some(Self::Hit),
            204 => Some(Self::Sunk),
            205 => Some(Self::FleetSunk),
            220 => Some(Self::ConnectionClosed),
            400 => Some(Self::SyntaxError),
            401 => Some(Self::SequenceError),
            402 => Some(Self::AlreadyShot),
            403 => Some(Self::NotYourTurn),
            500 => Some(Self::InternalError),
            _ => None,
        }
    }

    /// True for 1xx and 2xx codes.
    pub fn is_success(self) -> bool {
        self.code() < 400
    }

    /// True for 4xx codes — the peer violated the protocol or a game
    /// rule, but the connection can continue.
    pub fn is_client_fault(self) -> bool {
        (400..500).contains(&self.code())
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
