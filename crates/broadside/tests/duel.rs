//! End-to-end tests: two peers over real TCP on a loopback socket.

use std::time::Duration;

use broadside::{
    Board, BroadsideError, ConnectionState, Coordinate, EngineError,
    Orientation, Peer, Player, ResponseCode, Settings, ShipKind, ShotResult,
};

fn coord(text: &str) -> Coordinate {
    Coordinate::parse(text).unwrap()
}

/// A fully-placed fleet hugging the left edge, one ship per row:
/// Carrier A1–E1, Battleship A2–D2, Cruiser A3–C3, Submarine A4–C4,
/// Destroyer A5–B5.
fn fleet() -> Board {
    let mut board = Board::new();
    for (i, kind) in ShipKind::ALL.iter().enumerate() {
        board
            .place_ship(
                *kind,
                Coordinate::new(0, i as u8).unwrap(),
                Orientation::Across,
            )
            .unwrap();
    }
    board
}

async fn wait_for_state(peer: &Peer, want: ConnectionState) {
    let mut states = peer.subscribe_state();
    tokio::time::timeout(
        Duration::from_secs(5),
        states.wait_for(|state| *state == want),
    )
    .await
    .unwrap_or_else(|_| panic!("never reached {want}"))
    .unwrap();
}

/// Runs the whole connect/host handshake and returns (host, guest),
/// both in Idle state.
async fn handshake_pair() -> (Peer, Peer) {
    let hosting = Peer::host(
        Settings::for_addr("127.0.0.1:0"),
        fleet(),
        Player::new("Hattie").unwrap(),
    )
    .await
    .unwrap();
    let addr = hosting.local_addr().unwrap();

    let host_task = tokio::spawn(async move { hosting.accept().await.unwrap() });
    let guest = Peer::connect(
        Settings::for_addr(addr.to_string()),
        fleet(),
        Player::new("Gustav").unwrap(),
    )
    .await
    .unwrap();
    let host = host_task.await.unwrap();

    wait_for_state(&host, ConnectionState::Idle).await;
    wait_for_state(&guest, ConnectionState::Idle).await;
    (host, guest)
}

/// Handshake plus START: guest's turn first.
async fn in_game_pair() -> (Peer, Peer) {
    let (host, guest) = handshake_pair().await;
    guest.start().await.unwrap();
    wait_for_state(&host, ConnectionState::InGame).await;
    (host, guest)
}

// =========================================================================
// Handshake
// =========================================================================

#[tokio::test]
async fn test_handshake_identifies_both_sides() {
    let (host, guest) = handshake_pair().await;

    assert_eq!(host.opponent().as_deref(), Some("Gustav"));
    assert_eq!(guest.opponent().as_deref(), Some("Hattie"));
    assert_eq!(host.state(), ConnectionState::Idle);
    assert_eq!(guest.state(), ConnectionState::Idle);
}

#[tokio::test]
async fn test_unplaced_fleet_is_rejected_before_any_network_io() {
    let result = Peer::host(
        Settings::for_addr("127.0.0.1:0"),
        Board::new(),
        Player::new("Hattie").unwrap(),
    )
    .await;
    assert!(matches!(result, Err(BroadsideError::Game(_))));

    let result = Peer::connect(
        // Nothing listens here; the board check must fire first.
        Settings::for_addr("127.0.0.1:1"),
        Board::new(),
        Player::new("Gustav").unwrap(),
    )
    .await;
    assert!(matches!(result, Err(BroadsideError::Game(_))));
}

#[tokio::test]
async fn test_hello_is_rejected_outside_handshake() {
    let (_host, guest) = handshake_pair().await;

    // A second HELLO after the handshake is a sequence violation,
    // answered over the wire with 401.
    let reply = guest
        .connection()
        .call("HELLO", Some("Impostor"), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(reply.code, ResponseCode::SequenceError);
}

// =========================================================================
// START
// =========================================================================

#[tokio::test]
async fn test_host_cannot_start() {
    let (host, _guest) = handshake_pair().await;
    let result = host.start().await;
    assert!(matches!(result, Err(BroadsideError::HostCannotStart)));
}

#[tokio::test]
async fn test_start_twice_is_a_local_usage_fault() {
    let (_host, guest) = in_game_pair().await;
    let result = guest.start().await;
    assert!(matches!(
        result,
        Err(BroadsideError::WrongState {
            state: ConnectionState::InGame,
        })
    ));
}

#[tokio::test]
async fn test_fire_before_start_is_a_local_usage_fault() {
    let (_host, guest) = handshake_pair().await;
    let result = guest.fire(coord("A1")).await;
    assert!(matches!(
        result,
        Err(BroadsideError::WrongState {
            state: ConnectionState::Idle,
        })
    ));
}

// =========================================================================
// FIRE and turn order
// =========================================================================

#[tokio::test]
async fn test_turn_violation_fails_locally_with_nothing_sent() {
    let (host, guest) = in_game_pair().await;

    // Guest fires first; the host is out of turn.
    assert!(guest.my_turn());
    assert!(!host.my_turn());
    let result = host.fire(coord("J10")).await;
    assert!(matches!(result, Err(BroadsideError::NotYourTurn)));

    // Nothing went over the wire: the guest can still fire cleanly and
    // the turn order is undisturbed.
    let report = guest.fire(coord("J10")).await.unwrap();
    assert_eq!(report.result, ShotResult::Miss);
}

#[tokio::test]
async fn test_turns_alternate_and_hits_resolve() {
    let (host, guest) = in_game_pair().await;

    // Guest hits the host's carrier at A1.
    let report = guest.fire(coord("A1")).await.unwrap();
    assert_eq!(report.result, ShotResult::Hit);
    assert!(!guest.my_turn());

    // Now it is the host's turn.
    let mut host_turns = host.subscribe_turn();
    tokio::time::timeout(Duration::from_secs(5), host_turns.wait_for(|t| *t))
        .await
        .expect("host never got the turn")
        .unwrap();
    let report = host.fire(coord("J10")).await.unwrap();
    assert_eq!(report.result, ShotResult::Miss);

    // And back to the guest.
    let mut guest_turns = guest.subscribe_turn();
    tokio::time::timeout(Duration::from_secs(5), guest_turns.wait_for(|t| *t))
        .await
        .expect("guest never got the turn back")
        .unwrap();
    assert!(guest.my_turn());
}

#[tokio::test]
async fn test_repeated_coordinate_is_rejected_with_already_shot() {
    let (host, guest) = in_game_pair().await;

    guest.fire(coord("A1")).await.unwrap();
    wait_turn(&host).await;
    host.fire(coord("J10")).await.unwrap();
    wait_turn(&guest).await;

    let result = guest.fire(coord("A1")).await;
    match result {
        Err(BroadsideError::FireRejected { code, .. }) => {
            assert_eq!(code, ResponseCode::AlreadyShot);
        }
        other => panic!("expected FireRejected, got {other:?}"),
    }

    // A rejection does not spend the turn.
    assert!(guest.my_turn());
    let report = guest.fire(coord("B1")).await.unwrap();
    assert_eq!(report.result, ShotResult::Hit);
}

#[tokio::test]
async fn test_sinking_a_ship_names_it() {
    let (host, guest) = in_game_pair().await;

    // Host's destroyer sits at A5–B5.
    guest.fire(coord("A5")).await.unwrap();
    wait_turn(&host).await;
    host.fire(coord("J10")).await.unwrap();
    wait_turn(&guest).await;

    let report = guest.fire(coord("B5")).await.unwrap();
    assert_eq!(report.result, ShotResult::Sunk);
    assert!(
        report.message.as_deref().unwrap_or("").contains("Destroyer"),
        "message {:?}",
        report.message
    );
}

#[tokio::test]
async fn test_destroying_the_fleet_wins() {
    let (host, guest) = in_game_pair().await;

    // Every cell of the host's fleet, in placement order.
    let mut targets = Vec::new();
    for (i, kind) in ShipKind::ALL.iter().enumerate() {
        for step in 0..kind.length() {
            targets.push(Coordinate::new(step, i as u8).unwrap());
        }
    }
    // Interleave with host misses along empty rows.
    let mut misses = (0..10)
        .flat_map(|col| [(col, 7u8), (col, 8u8)])
        .map(|(col, row)| Coordinate::new(col, row).unwrap());

    let last = targets.len() - 1;
    for (i, target) in targets.into_iter().enumerate() {
        let report = guest.fire(target).await.unwrap();
        if i == last {
            assert_eq!(report.result, ShotResult::FleetSunk);
            break;
        }
        assert_ne!(report.result, ShotResult::Miss, "target {target}");
        wait_turn(&host).await;
        let report = host.fire(misses.next().unwrap()).await.unwrap();
        assert_eq!(report.result, ShotResult::Miss);
        wait_turn(&guest).await;
    }
}

async fn wait_turn(peer: &Peer) {
    let mut turns = peer.subscribe_turn();
    tokio::time::timeout(Duration::from_secs(5), turns.wait_for(|t| *t))
        .await
        .expect("turn never arrived")
        .unwrap();
}

// =========================================================================
// HELP and low-level waits
// =========================================================================

#[tokio::test]
async fn test_help_lists_the_command_set_in_any_state() {
    let (_host, guest) = handshake_pair().await;

    let listing = guest.help().await.unwrap();
    for verb in ["FIRE", "HELLO", "HELP", "QUIT", "START"] {
        assert!(listing.contains(verb), "listing {listing:?}");
    }
    // No state transition happened.
    assert_eq!(guest.state(), ConnectionState::Idle);
}

#[tokio::test]
async fn test_expect_response_times_out_against_a_silent_peer() {
    let (_host, guest) = handshake_pair().await;

    let started = std::time::Instant::now();
    let result = guest
        .connection()
        .expect_response(Duration::from_millis(50))
        .await;
    assert!(matches!(result, Err(EngineError::Timeout(_))));
    assert!(started.elapsed() >= Duration::from_millis(45));

    // The slot is free again.
    let listing = guest.help().await.unwrap();
    assert!(!listing.is_empty());
}

// =========================================================================
// Disconnect
// =========================================================================

#[tokio::test]
async fn test_guest_disconnect_handshake() {
    let (host, guest) = handshake_pair().await;

    guest.disconnect().await.unwrap();

    wait_for_state(&guest, ConnectionState::Disconnected).await;
    wait_for_state(&host, ConnectionState::Disconnected).await;
}

#[tokio::test]
async fn test_host_disconnect_closes_immediately() {
    let (host, guest) = in_game_pair().await;

    host.disconnect().await.unwrap();

    wait_for_state(&host, ConnectionState::Disconnected).await;
    wait_for_state(&guest, ConnectionState::Disconnected).await;
}

#[tokio::test]
async fn test_double_disconnect_is_a_usage_fault() {
    let (_host, guest) = handshake_pair().await;

    guest.disconnect().await.unwrap();
    let again = guest.disconnect().await;
    assert!(matches!(
        again,
        Err(BroadsideError::Engine(EngineError::AlreadyDisconnected))
    ));
}

#[tokio::test]
async fn test_mid_game_disconnect_is_clean() {
    let (host, guest) = in_game_pair().await;

    guest.fire(coord("A1")).await.unwrap();
    guest.disconnect().await.unwrap();

    wait_for_state(&guest, ConnectionState::Disconnected).await;
    wait_for_state(&host, ConnectionState::Disconnected).await;
}
