//! End-to-end tests: real WebSocket clients against a running server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use gridsnake_game::GameConfig;
use gridsnake_protocol::{
    ClientMessage, Dir, PlayerId, RoundPhase, ServerMessage, decode, encode,
};
use gridsnake_server::GameServer;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns its address.
async fn start_server() -> String {
    let server = GameServer::bind("127.0.0.1:0", GameConfig::default())
        .await
        .expect("server should bind");
    let addr = server.local_addr().expect("local addr").to_string();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, msg: &ClientMessage) {
    let text = encode(msg).expect("encode");
    ws.send(Message::Text(text.into())).await.expect("send");
}

/// Receives the next server message, skipping non-text frames. Panics
/// after two seconds of silence.
async fn recv(ws: &mut ClientWs) -> ServerMessage {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("frame error");
        if let Message::Text(text) = frame {
            return decode(&text).expect("decode server message");
        }
    }
}

/// Skips messages until one matches the predicate.
async fn recv_until<F>(ws: &mut ClientWs, mut pred: F) -> ServerMessage
where
    F: FnMut(&ServerMessage) -> bool,
{
    for _ in 0..200 {
        let msg = recv(ws).await;
        if pred(&msg) {
            return msg;
        }
    }
    panic!("no matching message within 200 frames");
}

/// Consumes the `hello` greeting and returns the assigned id.
async fn hello(ws: &mut ClientWs) -> PlayerId {
    match recv(ws).await {
        ServerMessage::Hello { id, .. } => id,
        other => panic!("expected hello, got {other:?}"),
    }
}

/// Creates a room from this connection and returns its code. Consumes
/// the `joined` and `players` messages.
async fn create_room(ws: &mut ClientWs, name: &str) -> String {
    send(
        ws,
        &ClientMessage::Create {
            name: name.into(),
            color: "#f00".into(),
        },
    )
    .await;
    let code = match recv(ws).await {
        ServerMessage::Joined { room, .. } => room.code.0,
        other => panic!("expected joined, got {other:?}"),
    };
    assert!(matches!(recv(ws).await, ServerMessage::Players { .. }));
    code
}

// =========================================================================
// Connect
// =========================================================================

#[tokio::test]
async fn hello_announces_constants_and_unique_ids() {
    let addr = start_server().await;

    let mut ws1 = connect(&addr).await;
    let msg = recv(&mut ws1).await;
    let id1 = match msg {
        ServerMessage::Hello {
            id,
            grid,
            tick_hz,
            round_ms,
            speed,
        } => {
            assert_eq!(grid, 20);
            assert_eq!(tick_hz, 20);
            assert_eq!(round_ms, 120_000);
            assert_eq!(speed, 7.5);
            id
        }
        other => panic!("expected hello, got {other:?}"),
    };

    let mut ws2 = connect(&addr).await;
    let id2 = hello(&mut ws2).await;
    assert_ne!(id1, id2);
}

// =========================================================================
// Create / join
// =========================================================================

#[tokio::test]
async fn create_room_returns_joined_with_lobby_snapshot() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    let me = hello(&mut ws).await;

    send(
        &mut ws,
        &ClientMessage::Create {
            name: "ana".into(),
            color: "#f00".into(),
        },
    )
    .await;

    match recv(&mut ws).await {
        ServerMessage::Joined { you, room } => {
            assert_eq!(you, me);
            assert_eq!(room.code.0.len(), 5);
            assert_eq!(room.phase, RoundPhase::Lobby);
            assert_eq!(room.players.len(), 1);
            assert_eq!(room.players[0].name, "ana");
        }
        other => panic!("expected joined, got {other:?}"),
    }
    assert!(matches!(recv(&mut ws).await, ServerMessage::Players { .. }));
}

#[tokio::test]
async fn join_by_code_is_case_insensitive() {
    let addr = start_server().await;

    let mut ws1 = connect(&addr).await;
    hello(&mut ws1).await;
    let code = create_room(&mut ws1, "ana").await;

    let mut ws2 = connect(&addr).await;
    let p2 = hello(&mut ws2).await;
    send(
        &mut ws2,
        &ClientMessage::Join {
            code: code.to_lowercase(),
            name: "bo".into(),
            color: "#0f0".into(),
        },
    )
    .await;

    match recv(&mut ws2).await {
        ServerMessage::Joined { you, room } => {
            assert_eq!(you, p2);
            assert_eq!(room.code.0, code);
            assert_eq!(room.players.len(), 2);
        }
        other => panic!("expected joined, got {other:?}"),
    }

    // The first member sees the updated roster.
    let msg = recv_until(&mut ws1, |m| matches!(m, ServerMessage::Players { .. })).await;
    let ServerMessage::Players { room } = msg else {
        unreachable!()
    };
    assert_eq!(room.players.len(), 2);
}

#[tokio::test]
async fn unknown_room_errors_but_connection_survives() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    hello(&mut ws).await;

    send(
        &mut ws,
        &ClientMessage::Join {
            code: "QQQQQ".into(),
            name: "bo".into(),
            color: "#0f0".into(),
        },
    )
    .await;

    match recv(&mut ws).await {
        ServerMessage::Error { message } => assert!(message.contains("not found")),
        other => panic!("expected error, got {other:?}"),
    }

    // Still connected and serviced.
    send(&mut ws, &ClientMessage::Ping { t: 7 }).await;
    assert!(matches!(recv(&mut ws).await, ServerMessage::Pong { t: 7 }));
}

#[tokio::test]
async fn fifth_player_is_rejected_as_full() {
    let addr = start_server().await;

    let mut ws1 = connect(&addr).await;
    hello(&mut ws1).await;
    let code = create_room(&mut ws1, "p1").await;

    let mut others = Vec::new();
    for i in 2..=4 {
        let mut ws = connect(&addr).await;
        hello(&mut ws).await;
        send(
            &mut ws,
            &ClientMessage::Join {
                code: code.clone(),
                name: format!("p{i}"),
                color: "#fff".into(),
            },
        )
        .await;
        assert!(matches!(recv(&mut ws).await, ServerMessage::Joined { .. }));
        others.push(ws);
    }

    let mut ws5 = connect(&addr).await;
    hello(&mut ws5).await;
    send(
        &mut ws5,
        &ClientMessage::Join {
            code,
            name: "p5".into(),
            color: "#fff".into(),
        },
    )
    .await;
    match recv(&mut ws5).await {
        ServerMessage::Error { message } => assert!(message.contains("full")),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn join_after_start_is_rejected() {
    let addr = start_server().await;

    let mut ws1 = connect(&addr).await;
    hello(&mut ws1).await;
    let code = create_room(&mut ws1, "ana").await;

    send(&mut ws1, &ClientMessage::Start).await;
    // Once the creator sees the round broadcast, the actor has started.
    recv_until(&mut ws1, |m| matches!(m, ServerMessage::Room { .. })).await;

    let mut ws2 = connect(&addr).await;
    hello(&mut ws2).await;
    send(
        &mut ws2,
        &ClientMessage::Join {
            code,
            name: "late".into(),
            color: "#0f0".into(),
        },
    )
    .await;
    match recv(&mut ws2).await {
        ServerMessage::Error { message } => assert!(message.contains("started")),
        other => panic!("expected error, got {other:?}"),
    }
}

// =========================================================================
// Round
// =========================================================================

#[tokio::test]
async fn start_broadcasts_room_then_streams_state() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    hello(&mut ws).await;
    create_room(&mut ws, "ana").await;

    send(&mut ws, &ClientMessage::Start).await;

    let msg = recv_until(&mut ws, |m| matches!(m, ServerMessage::Room { .. })).await;
    let ServerMessage::Room { room } = msg else {
        unreachable!()
    };
    assert_eq!(room.phase, RoundPhase::Running);
    assert!(room.food.is_some());

    let msg = recv_until(&mut ws, |m| matches!(m, ServerMessage::State { .. })).await;
    let ServerMessage::State { tick, players, .. } = msg else {
        unreachable!()
    };
    assert!(tick >= 1);
    assert_eq!(players.len(), 1);
    assert!(players[0].alive);
    assert_eq!(players[0].body.len(), 3);
}

#[tokio::test]
async fn input_shows_up_as_ack_and_turn_in_state() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    let me = hello(&mut ws).await;
    create_room(&mut ws, "ana").await;

    send(&mut ws, &ClientMessage::Start).await;
    send(
        &mut ws,
        &ClientMessage::Input {
            dir: Dir::DOWN,
            seq: 9,
        },
    )
    .await;

    let msg = recv_until(&mut ws, |m| {
        matches!(m, ServerMessage::State { players, .. }
            if players.iter().any(|p| p.id == me && p.ack == 9))
    })
    .await;
    let ServerMessage::State { players, .. } = msg else {
        unreachable!()
    };
    assert_eq!(players[0].dir, Dir::DOWN);
}

#[tokio::test]
async fn ping_gets_an_echoing_pong() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    hello(&mut ws).await;

    send(&mut ws, &ClientMessage::Ping { t: 123_456 }).await;
    assert!(matches!(
        recv(&mut ws).await,
        ServerMessage::Pong { t: 123_456 }
    ));
}

// =========================================================================
// Robustness / cleanup
// =========================================================================

#[tokio::test]
async fn malformed_frames_are_dropped_silently() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    hello(&mut ws).await;

    ws.send(Message::Text("not json".into())).await.unwrap();
    ws.send(Message::Text(r#"{"type":"teleport"}"#.into()))
        .await
        .unwrap();

    // No error frames; the connection keeps working.
    send(&mut ws, &ClientMessage::Ping { t: 1 }).await;
    assert!(matches!(recv(&mut ws).await, ServerMessage::Pong { t: 1 }));
}

#[tokio::test]
async fn emptied_room_is_destroyed_on_disconnect() {
    let addr = start_server().await;

    let mut ws1 = connect(&addr).await;
    hello(&mut ws1).await;
    let code = create_room(&mut ws1, "ana").await;

    ws1.close(None).await.expect("close");
    // Give the handler a moment to run its cleanup.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let mut ws2 = connect(&addr).await;
    hello(&mut ws2).await;
    send(
        &mut ws2,
        &ClientMessage::Join {
            code,
            name: "bo".into(),
            color: "#0f0".into(),
        },
    )
    .await;
    match recv(&mut ws2).await {
        ServerMessage::Error { message } => assert!(message.contains("not found")),
        other => panic!("expected error, got {other:?}"),
    }
}
