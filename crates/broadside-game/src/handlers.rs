//! The concrete command set: HELLO, START, FIRE, QUIT, HELP.
//!
//! Each handler holds the [`SharedBattle`] and implements the engine's
//! [`CommandHandler`] contract. State gating for *received* commands
//! lives here: a command outside its legal state faults with a
//! `401 SequenceError`, which the receive loop sends back to the peer.
//! (Locally initiated violations are the orchestrator's problem and
//! never reach the wire.)

use std::sync::Arc;
use std::time::Duration;

use broadside_engine::{
    CommandFault, CommandHandler, CommandRegistry, Connection,
    ConnectionState, EngineError, HandlerFuture, Role, QUIT_VERB,
};
use broadside_protocol::ResponseCode;

use crate::{Coordinate, SharedBattle, ShotOutcome};

/// Verb for the identity exchange.
pub const HELLO_VERB: &str = "HELLO";
/// Verb that begins play.
pub const START_VERB: &str = "START";
/// Verb that takes a shot.
pub const FIRE_VERB: &str = "FIRE";
/// Verb that lists the supported commands.
pub const HELP_VERB: &str = "HELP";

/// Bound on the host's reciprocal HELLO exchange.
const HELLO_ACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Registers the full command set against one battle table.
pub fn register_all(
    registry: &mut CommandRegistry,
    battle: &SharedBattle,
) -> Result<(), EngineError> {
    registry.register(
        HELLO_VERB,
        Arc::new(HelloHandler {
            battle: Arc::clone(battle),
        }),
    )?;
    registry.register(
        START_VERB,
        Arc::new(StartHandler {
            battle: Arc::clone(battle),
        }),
    )?;
    registry.register(
        FIRE_VERB,
        Arc::new(FireHandler {
            battle: Arc::clone(battle),
        }),
    )?;
    registry.register(QUIT_VERB, Arc::new(QuitHandler))?;
    registry.register(HELP_VERB, Arc::new(HelpHandler))?;
    Ok(())
}

fn send_failed(e: EngineError) -> CommandFault {
    CommandFault::internal(e.to_string())
}

// ---------------------------------------------------------------------------
// HELLO
// ---------------------------------------------------------------------------

/// `HELLO <name>` — the identity half of the handshake.
///
/// Valid during Handshake only. Stores the peer's declared name,
/// replies 200, and moves the connection to Idle. The host never
/// initiates HELLO; when one arrives it reciprocates with its own,
/// spawned so the receive loop is free to deliver the peer's 200.
pub struct HelloHandler {
    battle: SharedBattle,
}

impl CommandHandler for HelloHandler {
    fn handle<'a>(
        &'a self,
        argument: Option<&'a str>,
        conn: &'a Arc<Connection>,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            if conn.state() != ConnectionState::Handshake {
                return Err(CommandFault::sequence(
                    "HELLO is only valid during the handshake",
                ));
            }
            let name = argument
                .ok_or_else(|| CommandFault::syntax("HELLO requires a player name"))?;

            let local_name = {
                let mut battle = self.battle.lock();
                battle.set_opponent(name);
                battle.local().name().to_string()
            };
            tracing::info!(opponent = name, "peer identified");

            conn.send_response(
                ResponseCode::Ok,
                Some(&format!("welcome aboard, {name}")),
            )
            .await
            .map_err(send_failed)?;
            conn.set_state(ConnectionState::Idle)
                .map_err(send_failed)?;

            if conn.role() == Role::Host {
                let conn = Arc::clone(conn);
                tokio::spawn(async move {
                    match conn
                        .call(HELLO_VERB, Some(&local_name), HELLO_ACK_TIMEOUT)
                        .await
                    {
                        Ok(reply) if reply.code == ResponseCode::Ok => {}
                        Ok(reply) => tracing::warn!(
                            code = %reply.code,
                            "peer rejected our HELLO"
                        ),
                        Err(e) => tracing::warn!(
                            error = %e,
                            "reciprocal HELLO failed"
                        ),
                    }
                });
            }
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// START
// ---------------------------------------------------------------------------

/// `START` — begins play.
///
/// Valid during Idle, and only the host ever receives it: the
/// non-hosting peer initiates, the host passively waits. The initiator
/// fires first, so the receiving side starts without the turn.
pub struct StartHandler {
    battle: SharedBattle,
}

impl CommandHandler for StartHandler {
    fn handle<'a>(
        &'a self,
        _argument: Option<&'a str>,
        conn: &'a Arc<Connection>,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            if conn.state() != ConnectionState::Idle {
                return Err(CommandFault::sequence(
                    "START is only valid when idle",
                ));
            }
            if conn.role() != Role::Host {
                return Err(CommandFault::sequence(
                    "only the host accepts START",
                ));
            }
            conn.send_response(
                ResponseCode::GameStarted,
                Some("engagement started, you fire first"),
            )
            .await
            .map_err(send_failed)?;
            conn.set_state(ConnectionState::InGame)
                .map_err(send_failed)?;
            self.battle.lock().set_turn(false);
            tracing::info!("game started, peer fires first");
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// FIRE
// ---------------------------------------------------------------------------

/// `FIRE <coordinate> [banter]` — a shot at our waters.
///
/// Valid in game, and only while it is the peer's turn. A repeated
/// coordinate is rejected with 402 before it is resolved. On success
/// the outcome is reported (202/203/204/205) and the turn flips to us.
pub struct FireHandler {
    battle: SharedBattle,
}

impl CommandHandler for FireHandler {
    fn handle<'a>(
        &'a self,
        argument: Option<&'a str>,
        conn: &'a Arc<Connection>,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            if conn.state() != ConnectionState::InGame {
                return Err(CommandFault::sequence(
                    "FIRE is only valid during a game",
                ));
            }
            let argument = argument
                .ok_or_else(|| CommandFault::syntax("FIRE requires a coordinate"))?;
            // Anything after the coordinate token is banter; ignored.
            let token = argument
                .split_whitespace()
                .next()
                .unwrap_or(argument);
            let coord = Coordinate::parse(token)
                .map_err(|e| CommandFault::syntax(e.to_string()))?;

            let (code, message) = {
                let mut battle = self.battle.lock();
                if battle.my_turn() {
                    return Err(CommandFault::new(
                        ResponseCode::NotYourTurn,
                        "it is not your turn",
                    ));
                }
                if battle.board().is_shot_at(coord) {
                    return Err(CommandFault::new(
                        ResponseCode::AlreadyShot,
                        format!("{coord} was already shot"),
                    ));
                }
                let outcome = battle.board_mut().receive_shot(coord);
                battle.set_turn(true);
                let message = match outcome {
                    ShotOutcome::Miss => format!("miss at {coord}"),
                    ShotOutcome::Hit => format!("hit at {coord}"),
                    ShotOutcome::Sunk(kind) => {
                        format!("you sank our {}", kind.name())
                    }
                    ShotOutcome::FleetSunk => {
                        "fleet destroyed, you win".to_string()
                    }
                };
                (outcome.code(), message)
            };

            tracing::info!(%coord, %code, "incoming fire resolved");
            conn.send_response(code, Some(&message))
                .await
                .map_err(send_failed)
        })
    }
}

// ---------------------------------------------------------------------------
// QUIT
// ---------------------------------------------------------------------------

/// `QUIT` — the peer is leaving.
///
/// Valid in any non-terminal state (and the receive loop only runs in
/// non-terminal states). Acknowledges with 220 and closes.
pub struct QuitHandler;

impl CommandHandler for QuitHandler {
    fn handle<'a>(
        &'a self,
        _argument: Option<&'a str>,
        conn: &'a Arc<Connection>,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            tracing::info!("peer quit");
            conn.send_response(
                ResponseCode::ConnectionClosed,
                Some("closing connection"),
            )
            .await
            .map_err(send_failed)?;
            conn.request_close();
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// HELP
// ---------------------------------------------------------------------------

/// `HELP` — lists the registered verbs. Valid in any state, changes
/// nothing.
pub struct HelpHandler;

impl CommandHandler for HelpHandler {
    fn handle<'a>(
        &'a self,
        _argument: Option<&'a str>,
        conn: &'a Arc<Connection>,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let verbs = conn.registry().verbs().join(" ");
            conn.send_response(
                ResponseCode::Ok,
                Some(&format!("supported commands: {verbs}")),
            )
            .await
            .map_err(send_failed)
        })
    }
}
