//! WebSocket connection handlers.
//!
//! One task pair per connection: a receive loop that dispatches inbound
//! events to the use cases, and a pusher loop that drains the connection's
//! outbound channel into the socket. Cleanup runs exactly once per
//! connection, after either loop ends.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, RoomId},
    infrastructure::dto::{
        conversion::to_participant_infos,
        websocket::{ClientEvent, ServerEvent},
    },
    usecase::{DepartedRoom, JoinRoomError},
};

use super::super::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them
/// to the WebSocket sender.
///
/// All outbound traffic for a connection flows through its channel, so the
/// delivery order seen by the client matches the order the use cases
/// produced the messages in.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // The handle is generated server-side, per live connection. A user who
    // reconnects gets a fresh handle and is a logically new participant.
    let connection_id = ConnectionId::generate();

    let (mut sender, mut receiver) = socket.split();

    // Tell the client its handle before anything else
    let connected = ServerEvent::Connected {
        connection_handle: connection_id.to_string(),
    };
    let connected_json = serde_json::to_string(&connected).unwrap();
    if let Err(e) = sender.send(Message::Text(connected_json.into())).await {
        tracing::error!("Failed to send connected ack to '{}': {}", connection_id, e);
        return;
    }

    // Register the outbound channel; from here on the connection is in the
    // `Connected(no room)` state
    let (tx, rx) = mpsc::unbounded_channel();
    state.pusher.register_connection(connection_id, tx).await;
    tracing::info!("Connection '{}' established", connection_id);

    let state_clone = state.clone();
    let idle_timeout = state.idle_timeout;

    // Spawn a task to receive events from this connection
    let mut recv_task = tokio::spawn(async move {
        loop {
            // The idle timeout is opt-in configuration; when unset, a
            // connection occupies its room slot until it leaves or its
            // transport disconnects.
            let next = match idle_timeout {
                Some(window) => match tokio::time::timeout(window, receiver.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        tracing::info!(
                            "Connection '{}' produced no event for {:?}, evicting",
                            connection_id,
                            window
                        );
                        break;
                    }
                },
                None => receiver.next().await,
            };

            let Some(msg) = next else {
                break;
            };
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_client_event(&state_clone, connection_id, &text).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to receive messages from other connections and send them
    // to this one
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Cleanup is keyed by the connection handle and runs once even if the
    // transport signals the disconnect more than once
    match state.disconnect_usecase.execute(connection_id).await {
        Some(departed) => {
            tracing::info!(
                "Connection '{}' disconnected, left room '{}'",
                connection_id,
                departed.room_id
            );
            notify_departed_room(&state, &departed).await;
        }
        None => {
            tracing::info!("Connection '{}' disconnected", connection_id);
        }
    }
}

/// Parse and dispatch one inbound event.
///
/// Malformed payloads are logged and dropped; validation beyond the event
/// envelope belongs to the layers above this core.
async fn handle_client_event(state: &Arc<AppState>, connection_id: ConnectionId, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(
                "Failed to parse event from '{}': {} (raw: {})",
                connection_id,
                e,
                text
            );
            return;
        }
    };

    match event {
        ClientEvent::JoinRoom {
            room_id,
            participant_info,
        } => {
            let Some(room_id) = parse_room_id(&connection_id, room_id) else {
                return;
            };
            handle_join_room(state, connection_id, room_id, participant_info.into()).await;
        }
        ClientEvent::Signal { room_id, data } => {
            let Some(room_id) = parse_room_id(&connection_id, room_id) else {
                return;
            };
            // The payload is opaque; only the envelope names the sender
            let envelope = ServerEvent::Signal {
                room_id: room_id.as_str().to_string(),
                connection_handle: connection_id.to_string(),
                data,
            };
            let json = serde_json::to_string(&envelope).unwrap();
            state
                .relay_usecase
                .relay_signal(&room_id, &connection_id, &json)
                .await;
        }
        ClientEvent::ChatMessage { room_id, msg } => {
            let Some(room_id) = parse_room_id(&connection_id, room_id) else {
                return;
            };
            let envelope = ServerEvent::ChatMessage {
                room_id: room_id.as_str().to_string(),
                connection_handle: connection_id.to_string(),
                msg,
            };
            let json = serde_json::to_string(&envelope).unwrap();
            state
                .relay_usecase
                .relay_chat(&room_id, &connection_id, &json)
                .await;
        }
        ClientEvent::GetParticipants { room_id } => {
            let Some(room_id) = parse_room_id(&connection_id, room_id) else {
                return;
            };
            let participants = state.get_participants_usecase.execute(&room_id).await;
            let snapshot = ServerEvent::ParticipantsUpdate {
                room_id: room_id.into_string(),
                participants: to_participant_infos(&participants),
            };
            let json = serde_json::to_string(&snapshot).unwrap();
            if let Err(e) = state
                .get_participants_usecase
                .push_to_requester(&connection_id, &json)
                .await
            {
                tracing::warn!("Failed to answer get-participants: {}", e);
            }
        }
    }
}

fn parse_room_id(connection_id: &ConnectionId, raw: String) -> Option<RoomId> {
    match RoomId::new(raw) {
        Ok(room_id) => Some(room_id),
        Err(e) => {
            tracing::warn!("Invalid room id from '{}': {}", connection_id, e);
            None
        }
    }
}

/// Run the join sequence and the notifications it requires.
async fn handle_join_room(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    room_id: RoomId,
    profile: crate::domain::ParticipantProfile,
) {
    match state
        .join_room_usecase
        .execute(connection_id, room_id.clone(), profile)
        .await
    {
        Ok(joined) => {
            // The departure from the previous room (if any) is already
            // committed; its members hear about it first
            if let Some(departed) = &joined.departed {
                notify_departed_room(state, departed).await;
            }

            let joined_msg = ServerEvent::RoomJoined {
                room_id: joined.room_id.as_str().to_string(),
            };
            let joined_json = serde_json::to_string(&joined_msg).unwrap();
            if let Err(e) = state
                .join_room_usecase
                .push_to_requester(&connection_id, &joined_json)
                .await
            {
                tracing::warn!("Failed to send room-joined to '{}': {}", connection_id, e);
            }

            // peer-joined goes to the other members, and only when the
            // membership actually grew (a re-join broadcasts nothing)
            if joined.newly_added && joined.participants.len() > 1 {
                if let Some(me) = joined
                    .participants
                    .iter()
                    .find(|p| p.connection_id == connection_id)
                {
                    let peer_joined = ServerEvent::PeerJoined {
                        room_id: joined.room_id.as_str().to_string(),
                        connection_handle: connection_id.to_string(),
                        display_name: me.display_name.clone(),
                        avatar_ref: me.avatar_ref.clone(),
                        role: me.role.clone(),
                    };
                    let peer_joined_json = serde_json::to_string(&peer_joined).unwrap();
                    let others: Vec<ConnectionId> = joined
                        .participants
                        .iter()
                        .map(|p| p.connection_id)
                        .filter(|id| id != &connection_id)
                        .collect();
                    if let Err(e) = state
                        .join_room_usecase
                        .broadcast(others, &peer_joined_json)
                        .await
                    {
                        tracing::warn!("Failed to broadcast peer-joined: {}", e);
                    }
                }
            }

            // Authoritative snapshot to every member, the new one included,
            // so all clients converge regardless of message ordering
            let update = ServerEvent::ParticipantsUpdate {
                room_id: joined.room_id.as_str().to_string(),
                participants: to_participant_infos(&joined.participants),
            };
            let update_json = serde_json::to_string(&update).unwrap();
            let everyone: Vec<ConnectionId> = joined
                .participants
                .iter()
                .map(|p| p.connection_id)
                .collect();
            if let Err(e) = state
                .join_room_usecase
                .broadcast(everyone, &update_json)
                .await
            {
                tracing::warn!("Failed to broadcast participants-update: {}", e);
            }

            tracing::info!(
                "Connection '{}' joined room '{}' ({} member(s))",
                connection_id,
                joined.room_id,
                joined.participants.len()
            );
        }
        Err(JoinRoomError::RoomFull { room_id, departed }) => {
            // The departure from the previous room still happened
            if let Some(departed) = &departed {
                notify_departed_room(state, departed).await;
            }

            tracing::info!(
                "Connection '{}' rejected from full room '{}'",
                connection_id,
                room_id
            );
            let full_msg = ServerEvent::RoomFull {
                room_id: room_id.into_string(),
            };
            let full_json = serde_json::to_string(&full_msg).unwrap();
            // The requester alone hears about the rejection
            if let Err(e) = state
                .join_room_usecase
                .push_to_requester(&connection_id, &full_json)
                .await
            {
                tracing::warn!("Failed to send room-full to '{}': {}", connection_id, e);
            }
        }
    }
}

/// Notify a room's remaining members that a peer left, then send them the
/// refreshed membership snapshot.
async fn notify_departed_room(state: &Arc<AppState>, departed: &DepartedRoom) {
    if departed.remaining.is_empty() {
        // The room is gone; nobody is left to notify
        return;
    }

    let targets: Vec<ConnectionId> = departed.remaining.iter().map(|p| p.connection_id).collect();

    let peer_left = ServerEvent::PeerLeft {
        room_id: departed.room_id.as_str().to_string(),
        connection_handle: departed.departed.connection_id.to_string(),
        display_name: departed.departed.display_name.clone(),
        role: departed.departed.role.clone(),
    };
    let peer_left_json = serde_json::to_string(&peer_left).unwrap();
    if let Err(e) = state
        .disconnect_usecase
        .broadcast(targets.clone(), &peer_left_json)
        .await
    {
        tracing::warn!("Failed to broadcast peer-left: {}", e);
    }

    let update = ServerEvent::ParticipantsUpdate {
        room_id: departed.room_id.as_str().to_string(),
        participants: to_participant_infos(&departed.remaining),
    };
    let update_json = serde_json::to_string(&update).unwrap();
    if let Err(e) = state
        .disconnect_usecase
        .broadcast(targets, &update_json)
        .await
    {
        tracing::warn!("Failed to broadcast participants-update: {}", e);
    }
}
