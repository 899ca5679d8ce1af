//! The `Peer`: one local participant, wired end to end.
//!
//! This is where the layers meet: the transport opens the socket, the
//! engine runs it, the game handlers give the verbs meaning, and the
//! `Peer` exposes the operations a front end drives — host, connect,
//! start, fire, disconnect — enforcing the *local* side of state
//! gating. A locally illegal operation fails here as a usage fault and
//! never reaches the wire; the remote side of the same rules lives in
//! the handlers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use broadside_engine::{
    CommandRegistry, Connection, ConnectionState, EngineError, Role,
    TraceObserver,
};
use broadside_game::handlers::{self, FIRE_VERB, HELLO_VERB, HELP_VERB, START_VERB};
use broadside_game::{Battle, Board, Coordinate, Player, SharedBattle};
use broadside_protocol::{
    version_matches, ProtocolError, ResponseCode, PROTOCOL_VERSION,
};
use broadside_transport::{dial, Acceptor, LineReader, LineWriter, Settings};
use tokio::sync::watch;

use crate::BroadsideError;

/// Default bound on a single command/response exchange.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on the disconnect handshake.
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// The outcome of one of our shots, as reported by the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotResult {
    /// Open water.
    Miss,
    /// Struck a ship.
    Hit,
    /// Sank a ship (the report message names it).
    Sunk,
    /// Sank the last ship. We win.
    FleetSunk,
}

/// One resolved shot of ours.
#[derive(Debug, Clone)]
pub struct ShotReport {
    /// Where we fired.
    pub coordinate: Coordinate,
    /// What we hit.
    pub result: ShotResult,
    /// The peer's message, e.g. the name of the sunk ship.
    pub message: Option<String>,
}

/// A bound listener waiting for the one peer to call in.
///
/// Produced by [`Peer::host`]; call [`accept`](Self::accept) to finish
/// becoming a peer. Split from `host` so callers binding to port 0 can
/// learn the real port before blocking in accept.
pub struct Hosting {
    acceptor: Acceptor,
    board: Board,
    player: Player,
}

impl Hosting {
    /// The address actually bound.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.acceptor.local_addr()
    }

    /// Accepts the peer, sends the version greeting, and returns the
    /// connected peer in Handshake state. The host then waits passively
    /// for the peer's HELLO.
    pub async fn accept(self) -> Result<Peer, BroadsideError> {
        let (reader, writer) = self.acceptor.accept_one().await?;
        let peer = Peer::build(Role::Host, self.board, self.player, reader, writer)?;
        peer.conn.begin_listening()?;
        if let Err(e) = peer
            .conn
            .send_response(ResponseCode::VersionGreeting, Some(PROTOCOL_VERSION))
            .await
        {
            peer.teardown().await;
            return Err(e.into());
        }
        tracing::info!("greeting sent, awaiting HELLO");
        Ok(peer)
    }
}

/// The local participant in one game.
pub struct Peer {
    conn: Arc<Connection>,
    battle: SharedBattle,
}

impl Peer {
    fn build(
        role: Role,
        board: Board,
        player: Player,
        reader: LineReader,
        writer: LineWriter,
    ) -> Result<Self, BroadsideError> {
        let battle = Battle::shared(player, board);
        let mut registry = CommandRegistry::new();
        handlers::register_all(&mut registry, &battle)?;
        let conn = Connection::open(role, registry, reader, writer);
        conn.add_observer(Arc::new(TraceObserver));
        Ok(Self { conn, battle })
    }

    /// Binds a host. The board must be fully set up — checked before
    /// any network I/O, so we never open a connection that cannot
    /// proceed.
    pub async fn host(
        settings: Settings,
        board: Board,
        player: Player,
    ) -> Result<Hosting, BroadsideError> {
        if !board.all_ships_placed() {
            return Err(broadside_game::GameError::FleetNotPlaced.into());
        }
        let acceptor = Acceptor::bind(settings).await?;
        Ok(Hosting {
            acceptor,
            board,
            player,
        })
    }

    /// Connects to a host: waits for the version greeting, verifies it,
    /// and introduces the local player with HELLO.
    ///
    /// Returns with the connection still in Handshake state, pending
    /// the host's own HELLO; it moves to Idle when that arrives.
    pub async fn connect(
        settings: Settings,
        board: Board,
        player: Player,
    ) -> Result<Self, BroadsideError> {
        if !board.all_ships_placed() {
            return Err(broadside_game::GameError::FleetNotPlaced.into());
        }
        let timeout = settings.timeout;
        let (reader, writer) = dial(&settings).await?;
        let peer = Self::build(Role::Guest, board, player, reader, writer)?;

        // Claim the greeting wait before the receive loop starts, so
        // the greeting cannot land in an empty slot. join! polls the
        // wait first, which registers it synchronously.
        let (greeting, listening) = tokio::join!(
            peer.conn
                .ensure_response(ResponseCode::VersionGreeting, timeout),
            async { peer.conn.begin_listening() },
        );
        listening?;
        let greeting = match greeting {
            Ok(greeting) => greeting,
            Err(e) => {
                peer.teardown().await;
                return Err(e.into());
            }
        };

        let version = greeting.message.unwrap_or_default();
        if !version_matches(&version) {
            peer.teardown().await;
            return Err(ProtocolError::VersionMismatch { got: version }.into());
        }

        let name = peer.local_name();
        let reply = match peer.conn.call(HELLO_VERB, Some(&name), timeout).await {
            Ok(reply) => reply,
            Err(e) => {
                peer.teardown().await;
                return Err(e.into());
            }
        };
        if reply.code != ResponseCode::Ok {
            peer.teardown().await;
            return Err(EngineError::UnexpectedResponse {
                expected: ResponseCode::Ok,
                actual: reply.code,
                message: reply.message,
            }
            .into());
        }

        tracing::info!(player = %name, "connected and introduced");
        Ok(peer)
    }

    /// Begins play. Only the non-hosting peer may initiate; the host
    /// waits for the peer's START. The initiator takes the first turn.
    pub async fn start(&self) -> Result<(), BroadsideError> {
        if self.conn.role() != Role::Guest {
            return Err(BroadsideError::HostCannotStart);
        }
        match self.conn.state() {
            ConnectionState::Idle => {}
            state => return Err(BroadsideError::WrongState { state }),
        }
        let reply = self
            .conn
            .call(START_VERB, None, RESPONSE_TIMEOUT)
            .await?;
        if reply.code != ResponseCode::GameStarted {
            return Err(EngineError::UnexpectedResponse {
                expected: ResponseCode::GameStarted,
                actual: reply.code,
                message: reply.message,
            }
            .into());
        }
        self.conn.set_state(ConnectionState::InGame)?;
        self.battle.lock().set_turn(true);
        tracing::info!("game started, we fire first");
        Ok(())
    }

    /// Takes a shot. Legal only in game and on our turn — violations
    /// fail locally as usage faults with nothing sent. On success the
    /// peer's verdict is returned and the turn passes to them.
    pub async fn fire(
        &self,
        coordinate: Coordinate,
    ) -> Result<ShotReport, BroadsideError> {
        match self.conn.state() {
            ConnectionState::InGame => {}
            state => return Err(BroadsideError::WrongState { state }),
        }
        if !self.battle.lock().my_turn() {
            return Err(BroadsideError::NotYourTurn);
        }

        let reply = self
            .conn
            .call(FIRE_VERB, Some(&coordinate.to_string()), RESPONSE_TIMEOUT)
            .await?;
        let result = match reply.code {
            ResponseCode::Miss => ShotResult::Miss,
            ResponseCode::Hit => ShotResult::Hit,
            ResponseCode::Sunk => ShotResult::Sunk,
            ResponseCode::FleetSunk => ShotResult::FleetSunk,
            code => {
                return Err(BroadsideError::FireRejected {
                    code,
                    message: reply.message,
                })
            }
        };
        self.battle.lock().set_turn(false);
        tracing::info!(%coordinate, ?result, "shot resolved");
        Ok(ShotReport {
            coordinate,
            result,
            message: reply.message,
        })
    }

    /// Asks the peer for its command listing.
    pub async fn help(&self) -> Result<String, BroadsideError> {
        let reply = self.conn.call(HELP_VERB, None, RESPONSE_TIMEOUT).await?;
        Ok(reply.message.unwrap_or_default())
    }

    /// Runs the disconnect handshake for this peer's role (see
    /// [`Connection::disconnect`]). A second call is a usage fault.
    pub async fn disconnect(&self) -> Result<(), BroadsideError> {
        self.conn.disconnect(DISCONNECT_TIMEOUT).await?;
        Ok(())
    }

    /// The current connection state.
    pub fn state(&self) -> ConnectionState {
        self.conn.state()
    }

    /// Notifications on every state change.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.conn.subscribe_state()
    }

    /// Notifications on every turn change.
    pub fn subscribe_turn(&self) -> watch::Receiver<bool> {
        self.battle.lock().subscribe_turn()
    }

    /// Whether it is currently our turn.
    pub fn my_turn(&self) -> bool {
        self.battle.lock().my_turn()
    }

    /// The local player's name.
    pub fn local_name(&self) -> String {
        self.battle.lock().local().name().to_string()
    }

    /// The peer's declared name, once their HELLO has arrived.
    pub fn opponent(&self) -> Option<String> {
        self.battle.lock().opponent().map(str::to_string)
    }

    /// How many of our own ships are still afloat.
    pub fn ships_afloat(&self) -> usize {
        self.battle.lock().board().ships_afloat()
    }

    /// The underlying connection, for observers and low-level waits.
    pub fn connection(&self) -> &Arc<Connection> {
        &self.conn
    }

    /// Force-closes after a failed handshake step.
    async fn teardown(&self) {
        self.conn.request_close();
        self.conn.wait_closed().await;
    }
}
