//! TCP dial and accept helpers.
//!
//! Hosting in this protocol means serving exactly one peer: the
//! [`Acceptor`] hands out a single framed connection, not a stream of
//! them.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use crate::{split_lines, LineReader, LineWriter, Settings, TransportError};

/// Connects to `settings.addr` within `settings.timeout` and returns the
/// framed halves of the stream.
pub async fn dial(
    settings: &Settings,
) -> Result<(LineReader, LineWriter), TransportError> {
    let stream = timeout(settings.timeout, TcpStream::connect(&settings.addr))
        .await
        .map_err(|_| TransportError::Timeout(settings.timeout))?
        .map_err(TransportError::Connect)?;
    let _ = stream.set_nodelay(true);
    tracing::debug!(addr = %settings.addr, "connected");
    Ok(split_lines(stream, settings.encoding, settings.detect_bom))
}

/// A bound listener that accepts one incoming connection.
pub struct Acceptor {
    listener: TcpListener,
    settings: Settings,
}

impl Acceptor {
    /// Binds to `settings.addr`.
    pub async fn bind(settings: Settings) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(&settings.addr)
            .await
            .map_err(TransportError::Bind)?;
        tracing::info!(addr = %settings.addr, "listening");
        Ok(Self { listener, settings })
    }

    /// The address the listener actually bound to (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Waits up to `settings.timeout` for one incoming connection and
    /// returns its framed halves.
    pub async fn accept_one(
        self,
    ) -> Result<(LineReader, LineWriter), TransportError> {
        let (stream, peer) =
            timeout(self.settings.timeout, self.listener.accept())
                .await
                .map_err(|_| TransportError::Timeout(self.settings.timeout))?
                .map_err(TransportError::Accept)?;
        let _ = stream.set_nodelay(true);
        tracing::debug!(%peer, "accepted connection");
        Ok(split_lines(
            stream,
            self.settings.encoding,
            self.settings.detect_bom,
        ))
    }
}
