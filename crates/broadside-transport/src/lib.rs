//! Transport layer for Broadside: newline-delimited text over a byte
//! stream.
//!
//! The wire format is one packet per line. This crate owns everything
//! below the packet level: encoding, byte-order-mark handling, line
//! framing, and the TCP dial/accept plumbing. It never interprets the
//! lines it carries.
//!
//! A stream is split once into a [`LineReader`] (owned by the receive
//! loop) and a [`LineWriter`] (shared behind the engine's write lock).
//! Both are type-erased over the underlying stream, so tests can run the
//! whole stack over [`tokio::io::duplex`] pairs while production uses
//! [`tokio::net::TcpStream`].

mod error;
mod line;
mod tcp;

pub use error::TransportError;
pub use line::{split_lines, LineReader, LineWriter};
pub use tcp::{dial, Acceptor};

use std::time::Duration;

/// The text encoding applied to lines on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// UTF-8 (the default). Invalid sequences terminate the connection.
    #[default]
    Utf8,

    /// 7-bit ASCII. UTF-8-compatible on the wire, but any byte above
    /// 0x7F is rejected in both directions.
    Ascii,
}

/// Connection settings surfaced to callers.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Target address when dialing, bind address when hosting.
    pub addr: String,

    /// Text encoding for lines in both directions.
    pub encoding: TextEncoding,

    /// Strip a byte-order mark from the first line received, if present.
    pub detect_bom: bool,

    /// Bound on connect and accept, and the default bound for response
    /// waits driven by higher layers.
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:7870".to_string(),
            encoding: TextEncoding::Utf8,
            detect_bom: true,
            timeout: Duration::from_secs(10),
        }
    }
}

impl Settings {
    /// Settings for the given address, defaults elsewhere.
    pub fn for_addr(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Self::default()
        }
    }
}
