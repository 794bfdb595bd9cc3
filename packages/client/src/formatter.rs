//! Formatting of server events for terminal display.

use juku_server::infrastructure::dto::websocket::ParticipantInfo;
use juku_shared::time::timestamp_to_jst_rfc3339;

/// Renders server events as human-readable lines.
pub struct MessageFormatter;

impl MessageFormatter {
    pub fn format_connected(connection_handle: &str) -> String {
        format!("* connected (your handle: {connection_handle})\n")
    }

    pub fn format_room_joined(room_id: &str) -> String {
        format!("* joined room '{room_id}'\n")
    }

    pub fn format_room_full(room_id: &str) -> String {
        format!("* room '{room_id}' is full, join rejected\n")
    }

    pub fn format_peer_joined(display_name: &str, role: &str) -> String {
        format!("* {display_name} ({role}) joined the room\n")
    }

    pub fn format_peer_left(display_name: &str, role: &str) -> String {
        format!("* {display_name} ({role}) left the room\n")
    }

    /// Render the authoritative membership snapshot, marking our own entry.
    pub fn format_participants(participants: &[ParticipantInfo], my_handle: &str) -> String {
        if participants.is_empty() {
            return "* the room is empty\n".to_string();
        }

        let mut output = format!("* participants ({}):\n", participants.len());
        for participant in participants {
            let marker = if participant.connection_handle == my_handle {
                " (you)"
            } else {
                ""
            };
            output.push_str(&format!(
                "  - {} [{}] joined at {}{}\n",
                participant.display_name,
                participant.role,
                timestamp_to_jst_rfc3339(participant.joined_at),
                marker,
            ));
        }
        output
    }

    /// Render a relayed chat message; falls back to the raw payload when it
    /// has no "text" field.
    pub fn format_chat(connection_handle: &str, msg: &serde_json::Value) -> String {
        match msg.get("text").and_then(|text| text.as_str()) {
            Some(text) => format!("[{}] {}\n", short_handle(connection_handle), text),
            None => format!("[{}] {}\n", short_handle(connection_handle), msg),
        }
    }

    /// Signaling payloads are opaque; only note their arrival and size.
    pub fn format_signal(connection_handle: &str, data: &serde_json::Value) -> String {
        format!(
            "* signaling payload from {} ({} bytes)\n",
            short_handle(connection_handle),
            data.to_string().len(),
        )
    }
}

/// First 8 characters of a connection handle, enough to tell peers apart in
/// a 4 person room.
fn short_handle(connection_handle: &str) -> &str {
    connection_handle.get(..8).unwrap_or(connection_handle)
}
