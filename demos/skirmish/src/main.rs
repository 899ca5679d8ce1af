//! Skirmish: a two-terminal Broadside demo.
//!
//! Terminal one hosts, terminal two joins, and both sides then play a
//! deterministic scan of the grid until one fleet is gone:
//!
//! ```text
//! skirmish host --addr 127.0.0.1:7870 --name Hattie
//! skirmish join --addr 127.0.0.1:7870 --name Gustav
//! ```

use broadside::{
    Board, BroadsideError, ConnectionState, Coordinate, Orientation, Peer,
    Player, Settings, ShipKind, ShotResult,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skirmish", about = "Play a scripted game of Broadside")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Host a game and wait for one opponent.
    Host {
        /// Address to listen on.
        #[arg(long, default_value = "127.0.0.1:7870")]
        addr: String,
        /// Name announced to the opponent.
        #[arg(long, default_value = "Hattie")]
        name: String,
    },
    /// Join a hosted game and open fire.
    Join {
        /// Address of the host.
        #[arg(long, default_value = "127.0.0.1:7870")]
        addr: String,
        /// Name announced to the opponent.
        #[arg(long, default_value = "Gustav")]
        name: String,
    },
}

/// One ship per row, bows on column A.
fn fleet() -> Board {
    let mut board = Board::new();
    for (i, kind) in ShipKind::ALL.iter().enumerate() {
        board
            .place_ship(
                *kind,
                Coordinate::new(0, i as u8).expect("row in range"),
                Orientation::Across,
            )
            .expect("fixed layout places cleanly");
    }
    board
}

#[tokio::main]
async fn main() -> Result<(), BroadsideError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Host { addr, name } => {
            let hosting =
                Peer::host(Settings::for_addr(addr), fleet(), Player::new(name)?)
                    .await?;
            println!("listening on {:?}", hosting.local_addr());
            let peer = hosting.accept().await?;
            println!("opponent connected");
            play(peer).await
        }
        Command::Join { addr, name } => {
            let peer =
                Peer::connect(Settings::for_addr(addr), fleet(), Player::new(name)?)
                    .await?;
            // The host introduces itself right after acking our HELLO;
            // START is only legal once that lands.
            let mut states = peer.subscribe_state();
            let _ = states
                .wait_for(|state| *state == ConnectionState::Idle)
                .await;
            println!("connected to {}", peer.opponent().unwrap_or_default());
            peer.start().await?;
            println!("game on — we fire first");
            play(peer).await
        }
    }
}

/// Fires at the grid row by row whenever it is our turn, until someone's
/// fleet is gone or the peer hangs up.
async fn play(peer: Peer) -> Result<(), BroadsideError> {
    let mut targets = (0..10u8).flat_map(|row| {
        (0..10u8).map(move |col| Coordinate::new(col, row).expect("in range"))
    });
    let mut turns = peer.subscribe_turn();
    let mut states = peer.subscribe_state();

    loop {
        tokio::select! {
            turn = turns.wait_for(|mine| *mine) => {
                if turn.is_err() {
                    break;
                }
            }
            _ = states.wait_for(|state| state.is_terminal()) => {
                break;
            }
        }

        let Some(target) = targets.next() else { break };
        match peer.fire(target).await {
            Ok(report) => {
                println!(
                    "{target}: {:?}{}",
                    report.result,
                    report
                        .message
                        .map(|m| format!(" ({m})"))
                        .unwrap_or_default()
                );
                if report.result == ShotResult::FleetSunk {
                    println!("victory — disconnecting");
                    peer.disconnect().await?;
                    break;
                }
            }
            Err(BroadsideError::FireRejected { code, message }) => {
                println!("{target}: rejected {code} {message:?}");
            }
            // The losing side can race the winner's teardown here;
            // anything else that stops a shot just ends the game.
            Err(e) => {
                tracing::debug!(error = %e, "stopping play");
                break;
            }
        }
    }

    if peer.ships_afloat() == 0 {
        println!("our fleet is gone — defeat");
    }
    println!("connection {}", peer.state());
    Ok(())
}
