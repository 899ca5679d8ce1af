//! Read-only fan-out over everything the receive loop sees.
//!
//! Observers exist so error forwarding and disconnect detection can
//! watch the connection without touching the primary dispatch path.
//! They are invoked synchronously from the receive loop, so an observer
//! must not block — hand long work to your own task.

use broadside_protocol::Packet;

use crate::EngineError;

/// A passive listener on one connection.
///
/// All methods default to no-ops; implement only what you need.
pub trait PacketObserver: Send + Sync + 'static {
    /// A packet was received and parsed.
    fn on_packet(&self, _packet: &Packet) {}

    /// A fault was detected while receiving (syntax, sequence, or
    /// transport). The fault may or may not be terminal.
    fn on_fault(&self, _fault: &EngineError) {}

    /// The connection completed. Fires exactly once.
    fn on_closed(&self) {}
}

/// Forwards everything to `tracing`.
pub struct TraceObserver;

impl PacketObserver for TraceObserver {
    fn on_packet(&self, packet: &Packet) {
        tracing::trace!(%packet, "recv");
    }

    fn on_fault(&self, fault: &EngineError) {
        tracing::warn!(error = %fault, "protocol fault");
    }

    fn on_closed(&self) {
        tracing::debug!("connection completed");
    }
}
