//! Per-connection handler: hello, message dispatch, and cleanup.
//!
//! Each accepted socket gets its own Tokio task running this handler.
//! The flow is:
//!   1. WebSocket handshake, assign a player id, send `hello`
//!   2. Split the socket; a writer task drains the player's outbound
//!      channel so room broadcasts never block on a slow reader's frames
//!   3. Loop: decode client frames, dispatch to the registry/room
//!   4. On disconnect: leave the room, destroy it if now empty

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use gridsnake_game::GameConfig;
use gridsnake_protocol::{ClientMessage, PlayerId, RoomCode, ServerMessage, decode, encode};
use gridsnake_room::{PlayerSender, RoomHandle, RoomRegistry};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::tungstenite::Message;

use crate::ServerError;

/// Counter for assigning player ids, unique per server process.
static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    config: GameConfig,
    registry: Arc<Mutex<RoomRegistry>>,
) -> Result<(), ServerError> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut stream) = ws.split();

    let player_id = PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed));
    tracing::debug!(player = %player_id, "connection accepted");

    // The room actor and this handler both write through this channel;
    // the writer task is the only owner of the sink.
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let writer = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let text = match encode(&msg) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode outbound frame");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    send(
        &out_tx,
        ServerMessage::Hello {
            id: player_id,
            grid: config.grid,
            tick_hz: config.tick_hz,
            round_ms: config.round_ms,
            speed: config.speed,
        },
    );

    // The room this connection belongs to, if any. One room at a time.
    let mut membership: Option<RoomHandle> = None;

    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(player = %player_id, error = %e, "recv error");
                break;
            }
        };

        // Malformed frames are dropped without a reply; input frames are
        // high-frequency and best-effort.
        let msg: ClientMessage = match decode(&text) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(player = %player_id, error = %e, "dropping bad frame");
                continue;
            }
        };

        match msg {
            ClientMessage::Create { name, color } => {
                if membership.is_some() {
                    send_error(&out_tx, "already in a room");
                    continue;
                }
                let handle = registry.lock().await.create();
                match handle.join(player_id, name, color, out_tx.clone()).await {
                    Ok(()) => membership = Some(handle),
                    Err(e) => {
                        // Fresh and empty, so reap it right away.
                        let code = handle.code().clone();
                        registry.lock().await.destroy(&code).await;
                        send_error(&out_tx, &e.to_string());
                    }
                }
            }

            ClientMessage::Join { code, name, color } => {
                if membership.is_some() {
                    send_error(&out_tx, "already in a room");
                    continue;
                }
                let code = RoomCode::normalized(&code);
                // Lock only for the lookup; the join awaits the actor.
                let found = registry.lock().await.lookup(&code);
                match found {
                    Ok(handle) => {
                        match handle.join(player_id, name, color, out_tx.clone()).await {
                            Ok(()) => membership = Some(handle),
                            Err(e) => send_error(&out_tx, &e.to_string()),
                        }
                    }
                    Err(e) => send_error(&out_tx, &e.to_string()),
                }
            }

            ClientMessage::Start => {
                if let Some(handle) = &membership {
                    let _ = handle.start().await;
                }
            }

            ClientMessage::Input { dir, seq } => {
                if let Some(handle) = &membership {
                    let _ = handle.input(player_id, dir, seq).await;
                }
            }

            ClientMessage::Ping { t } => {
                send(&out_tx, ServerMessage::Pong { t });
            }
        }
    }

    // Disconnect cleanup: leave the room, and destroy it when this was
    // the last member.
    if let Some(handle) = membership.take() {
        match handle.leave(player_id).await {
            Ok(0) => registry.lock().await.destroy(handle.code()).await,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(player = %player_id, error = %e, "leave failed")
            }
        }
    }

    drop(out_tx);
    let _ = writer.await;
    tracing::debug!(player = %player_id, "connection closed");
    Ok(())
}

fn send(tx: &PlayerSender, msg: ServerMessage) {
    let _ = tx.send(msg);
}

fn send_error(tx: &PlayerSender, message: &str) {
    send(
        tx,
        ServerMessage::Error {
            message: message.to_string(),
        },
    );
}
