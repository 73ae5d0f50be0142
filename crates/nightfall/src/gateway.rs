//! Per-connection session gateway.
//!
//! Each accepted socket gets its own task running [`handle_connection`].
//! The gateway is the only component aware of transport: it decodes
//! inbound [`ClientEvent`]s into registry calls and relays the room
//! layer's [`Update`]s back out. All authoritative state lives in the
//! rooms; the gateway keeps only the subscription map for this one
//! connection.
//!
//! The socket is split in two. The write half is driven by a relay task
//! draining the connection's update channel — the same channel the room
//! actors broadcast into — so updates for one room reach the socket in
//! the order the room emitted them.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::ServerError;
use nightfall_engine::Role;
use nightfall_protocol::{ClientEvent, Codec, JsonCodec, PlayerId, RoomId, Update};
use nightfall_room::{GameCommand, RoomError, RoomRegistry, UpdateSender};

/// Handles a single connection from WebSocket upgrade to close.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    registry: Arc<RoomRegistry>,
) -> Result<(), ServerError> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    tracing::info!(%addr, "client connected");

    let (mut ws_tx, mut ws_rx) = ws.split();
    let codec = JsonCodec;

    // Outbound relay: room actors (and this task, for rejections) push
    // updates into `tx`; the relay serializes them onto the socket.
    let (tx, mut rx) = mpsc::unbounded_channel::<Update>();
    let relay = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            let bytes = match codec.encode(&update) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode update");
                    continue;
                }
            };
            if ws_tx.send(Message::Binary(bytes.into())).await.is_err() {
                break;
            }
        }
    });

    // Which rooms this connection joined, and under which identity.
    let mut subscriptions: HashMap<RoomId, PlayerId> = HashMap::new();

    while let Some(msg) = ws_rx.next().await {
        let data = match msg {
            Ok(Message::Binary(data)) => data.to_vec(),
            Ok(Message::Text(text)) => text.as_bytes().to_vec(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue, // ping/pong/frame
            Err(e) => {
                tracing::debug!(%addr, error = %e, "socket error");
                break;
            }
        };

        let event: ClientEvent = match codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                // One malformed frame never takes anyone else down; tell
                // the sender and move on.
                tracing::debug!(%addr, error = %e, "undecodable event");
                let _ = tx.send(Update::Rejected {
                    reason: format!("malformed event: {e}"),
                });
                continue;
            }
        };

        handle_event(&registry, &tx, &mut subscriptions, event, addr).await;
    }

    // Transport-level disconnect: an implicit leave of every subscribed
    // room, so no membership outlives its connection.
    tracing::info!(%addr, rooms = subscriptions.len(), "client disconnected");
    for (room_id, player) in subscriptions {
        match registry.leave(&room_id, player).await {
            Ok(()) => {}
            Err(RoomError::NotFound(_)) => {
                tracing::debug!(%addr, %room_id, "room already gone at disconnect");
            }
            Err(e) => {
                tracing::warn!(%addr, %room_id, error = %e, "disconnect cleanup failed");
            }
        }
    }

    drop(tx);
    let _ = relay.await;
    Ok(())
}

/// Dispatches one decoded event against the room registry.
async fn handle_event(
    registry: &Arc<RoomRegistry>,
    tx: &UpdateSender,
    subscriptions: &mut HashMap<RoomId, PlayerId>,
    event: ClientEvent,
    addr: SocketAddr,
) {
    match event {
        ClientEvent::JoinRoom { player, room_id } => {
            // One identity per room per connection. A second join under
            // the same name is idempotent; a different name is rejected
            // so a leave or disconnect can't strand the first identity.
            if let Some(existing) = subscriptions.get(&room_id) {
                if *existing != player {
                    reject(
                        tx,
                        format!("already joined room {room_id} as {existing}"),
                    );
                    return;
                }
            }
            match registry.join(room_id.clone(), player.clone(), tx.clone()).await {
                Ok(()) => {
                    subscriptions.insert(room_id, player);
                }
                Err(e) => reject(tx, e.to_string()),
            }
        }

        ClientEvent::LeaveRoom { player, room_id } => {
            match registry.leave(&room_id, player.clone()).await {
                Ok(()) => {}
                Err(RoomError::NotFound(_)) => {
                    tracing::debug!(%addr, %room_id, "leave for unknown room");
                }
                Err(e) => reject(tx, e.to_string()),
            }
            if subscriptions.get(&room_id) == Some(&player) {
                subscriptions.remove(&room_id);
            }
        }

        ClientEvent::StartGame { room_id, roles } => {
            let mut parsed = Vec::with_capacity(roles.len());
            for name in &roles {
                match Role::from_name(name) {
                    Some(role) => parsed.push(role),
                    None => {
                        reject(tx, format!("unknown role: {name}"));
                        return;
                    }
                }
            }
            game(registry, tx, subscriptions, &room_id, GameCommand::Start { roles: parsed }, addr)
                .await;
        }

        ClientEvent::NightAction { room_id, target } => {
            game(
                registry,
                tx,
                subscriptions,
                &room_id,
                GameCommand::NightAction { target },
                addr,
            )
            .await;
        }

        ClientEvent::EndNight { room_id } => {
            game(registry, tx, subscriptions, &room_id, GameCommand::EndNight, addr).await;
        }

        ClientEvent::BeginNight { room_id } => {
            game(registry, tx, subscriptions, &room_id, GameCommand::BeginNight, addr).await;
        }
    }
}

/// Routes a game command under the identity this connection joined with.
async fn game(
    registry: &Arc<RoomRegistry>,
    tx: &UpdateSender,
    subscriptions: &HashMap<RoomId, PlayerId>,
    room_id: &RoomId,
    cmd: GameCommand,
    addr: SocketAddr,
) {
    let Some(player) = subscriptions.get(room_id) else {
        reject(tx, format!("join room {room_id} first"));
        return;
    };
    match registry.game(room_id, player.clone(), cmd).await {
        Ok(()) => {}
        Err(RoomError::NotFound(_)) => {
            tracing::debug!(%addr, %room_id, "game command for unknown room");
        }
        Err(e) => reject(tx, e.to_string()),
    }
}

/// Sends a rejection to this connection only.
fn reject(tx: &UpdateSender, reason: String) {
    let _ = tx.send(Update::Rejected { reason });
}
