//! WebSocket event DTOs.
//!
//! The wire protocol is a small closed set of JSON messages tagged with a
//! `"type"` field (kebab-case). Inbound and outbound directions are separate
//! enums so that handler dispatch is exhaustively checked by the compiler.
//!
//! Signaling and chat payloads (`data` / `msg`) are opaque
//! `serde_json::Value`s: the coordinator relays them without parsing,
//! validating or persisting their contents.

use serde::{Deserialize, Serialize};

/// Profile supplied by the client in a `join-room` event.
///
/// All fields are free-form; the coordinator does not validate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantProfileDto {
    pub display_name: String,
    #[serde(default)]
    pub avatar_ref: Option<String>,
    #[serde(default)]
    pub role: String,
}

/// One participant entry in a `participants-update` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub connection_handle: String,
    pub display_name: String,
    pub avatar_ref: Option<String>,
    pub role: String,
    pub joined_at: i64,
}

/// Events a client may send to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Join (or switch to) a session room.
    JoinRoom {
        room_id: String,
        participant_info: ParticipantProfileDto,
    },
    /// Opaque signaling payload, relayed to the other room members.
    Signal {
        room_id: String,
        data: serde_json::Value,
    },
    /// Chat message, relayed to the other room members.
    ChatMessage {
        room_id: String,
        msg: serde_json::Value,
    },
    /// Request a membership snapshot (answered to the requester only).
    GetParticipants { room_id: String },
}

/// Events the server may send to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Sent once after the WebSocket upgrade; carries the server-generated
    /// connection handle.
    Connected { connection_handle: String },
    /// The join succeeded.
    RoomJoined { room_id: String },
    /// The join was rejected because the room is at capacity.
    RoomFull { room_id: String },
    /// A new peer is now in the room (sent to the other members).
    PeerJoined {
        room_id: String,
        connection_handle: String,
        display_name: String,
        avatar_ref: Option<String>,
        role: String,
    },
    /// A peer left the room or disconnected (sent to the remaining members).
    PeerLeft {
        room_id: String,
        connection_handle: String,
        display_name: String,
        role: String,
    },
    /// Authoritative full membership snapshot, in join order.
    ParticipantsUpdate {
        room_id: String,
        participants: Vec<ParticipantInfo>,
    },
    /// Relayed signaling payload (unchanged; the envelope names the sender).
    Signal {
        room_id: String,
        connection_handle: String,
        data: serde_json::Value,
    },
    /// Relayed chat message (unchanged; the envelope names the sender).
    ChatMessage {
        room_id: String,
        connection_handle: String,
        msg: serde_json::Value,
    },
}
