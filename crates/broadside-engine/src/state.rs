//! The connection-lifecycle state machine.

use std::fmt;

/// The lifecycle state of a connection.
///
/// ```text
/// Handshake ──(HELLO)──→ Idle ──(START)──→ InGame
///     │                   │                  │
///     └───────────────────┴──(QUIT/closure)──┴──→ Disconnected
/// ```
///
/// Transitions are one-directional: `InGame` is entered at most once and
/// `Disconnected` is terminal. Transitions happen only as side effects
/// of specific commands and of the disconnect handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Initial state: peers exchange version and identity.
    Handshake,

    /// Identified, waiting for play to begin.
    Idle,

    /// Play in progress.
    InGame,

    /// Terminal: the connection has completed.
    Disconnected,
}

impl ConnectionState {
    /// True for the terminal state.
    pub fn is_terminal(self) -> bool {
        self == Self::Disconnected
    }

    /// Whether the transition `self -> next` is in the legal table.
    /// A same-value "transition" is not in the table; setting the
    /// current state again is a separate no-op case handled by the
    /// connection.
    pub fn can_transition_to(self, next: Self) -> bool {
        use ConnectionState::{Disconnected, Handshake, Idle, InGame};
        matches!(
            (self, next),
            (Handshake, Idle)
                | (Idle, InGame)
                | (Handshake | Idle | InGame, Disconnected)
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handshake => write!(f, "handshake"),
            Self::Idle => write!(f, "idle"),
            Self::InGame => write!(f, "in-game"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectionState::{Disconnected, Handshake, Idle, InGame};

    #[test]
    fn test_legal_transitions() {
        assert!(Handshake.can_transition_to(Idle));
        assert!(Idle.can_transition_to(InGame));
        assert!(Handshake.can_transition_to(Disconnected));
        assert!(Idle.can_transition_to(Disconnected));
        assert!(InGame.can_transition_to(Disconnected));
    }

    #[test]
    fn test_illegal_transitions() {
        // No skipping forward.
        assert!(!Handshake.can_transition_to(InGame));
        // No going back.
        assert!(!Idle.can_transition_to(Handshake));
        assert!(!InGame.can_transition_to(Idle));
        // Terminal means terminal.
        assert!(!Disconnected.can_transition_to(Handshake));
        assert!(!Disconnected.can_transition_to(Idle));
        assert!(!Disconnected.can_transition_to(InGame));
    }

    #[test]
    fn test_same_state_is_not_a_transition() {
        assert!(!Idle.can_transition_to(Idle));
        assert!(!Disconnected.can_transition_to(Disconnected));
    }

    #[test]
    fn test_only_disconnected_is_terminal() {
        assert!(Disconnected.is_terminal());
        assert!(!Handshake.is_terminal());
        assert!(!Idle.is_terminal());
        assert!(!InGame.is_terminal());
    }
}
