//! The per-connection game table.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::{Board, Player};

/// What both the command handlers and the orchestrator need to share:
/// who we are, who the peer turned out to be, our own waters, and whose
/// turn it is.
///
/// Shared as [`SharedBattle`]; lock briefly, never across an await.
pub struct Battle {
    local: Player,
    opponent: Option<String>,
    board: Board,
    turn_tx: watch::Sender<bool>,
}

/// Handle shared between the handlers and the orchestrator.
pub type SharedBattle = Arc<Mutex<Battle>>;

impl Battle {
    /// A fresh table. It is not yet anyone's turn.
    pub fn new(local: Player, board: Board) -> Self {
        let (turn_tx, _) = watch::channel(false);
        Self {
            local,
            opponent: None,
            board,
            turn_tx,
        }
    }

    /// Wraps a table for sharing.
    pub fn shared(local: Player, board: Board) -> SharedBattle {
        Arc::new(Mutex::new(Self::new(local, board)))
    }

    /// The local player.
    pub fn local(&self) -> &Player {
        &self.local
    }

    /// The peer's declared name, once their HELLO has arrived.
    pub fn opponent(&self) -> Option<&str> {
        self.opponent.as_deref()
    }

    /// Records the peer's declared name.
    pub fn set_opponent(&mut self, name: &str) {
        self.opponent = Some(name.to_string());
    }

    /// Own waters.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Own waters, mutably (shot resolution).
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Whether it is currently the local player's turn.
    pub fn my_turn(&self) -> bool {
        *self.turn_tx.borrow()
    }

    /// Flips (or sets) the turn. Subscribers are notified only when the
    /// value actually changes.
    pub fn set_turn(&mut self, mine: bool) {
        self.turn_tx.send_if_modified(|current| {
            if *current == mine {
                false
            } else {
                *current = mine;
                true
            }
        });
    }

    /// A watch on turn changes.
    pub fn subscribe_turn(&self) -> watch::Receiver<bool> {
        self.turn_tx.subscribe()
    }
}
