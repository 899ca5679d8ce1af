//! Wire protocol for Broadside.
//!
//! This crate defines the "language" that the two peers speak:
//!
//! - **Packets** ([`Packet`]) — one line of text on the wire, either a
//!   [`Packet::Command`] (verb plus optional argument) or a
//!   [`Packet::Response`] (numeric code plus optional message).
//! - **Codes** ([`ResponseCode`]) — the fixed enumeration of numeric
//!   response codes, grouped SMTP-style by leading digit.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while parsing or
//!   constructing a packet.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw text lines) and the
//! connection engine (dispatch and correlation). It doesn't know about
//! sockets, states, or turns — it only knows how one line of text maps
//! to one packet and back.
//!
//! ```text
//! Transport (line of text) → Protocol (Packet) → Engine (dispatch/correlate)
//! ```

mod code;
mod error;
mod packet;

pub use code::ResponseCode;
pub use error::ProtocolError;
pub use packet::Packet;

/// The version string exchanged in the greeting Response when a
/// connection is established. Peers with a different version are
/// rejected during the handshake.
pub const PROTOCOL_VERSION: &str = "BATTLESHIP/1.0";

/// Checks a received greeting payload against [`PROTOCOL_VERSION`].
///
/// The match is exact but case-insensitive; an empty string never
/// matches.
pub fn version_matches(version: &str) -> bool {
    !version.is_empty() && version.eq_ignore_ascii_case(PROTOCOL_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_exact() {
        assert!(version_matches("BATTLESHIP/1.0"));
    }

    #[test]
    fn test_version_matches_is_case_insensitive() {
        assert!(version_matches("battleship/1.0"));
        assert!(version_matches("Battleship/1.0"));
    }

    #[test]
    fn test_version_rejects_empty_and_mismatch() {
        assert!(!version_matches(""));
        assert!(!version_matches("BATTLESHIP/2.0"));
        assert!(!version_matches("BATTLESHIP"));
    }
}
