//! WebSocket client session management.

use std::io::Write as _;

use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use juku_server::infrastructure::dto::websocket::{
    ClientEvent, ParticipantProfileDto, ServerEvent,
};
use juku_shared::time::get_jst_timestamp;

use crate::{error::ClientError, formatter::MessageFormatter};

/// Join parameters supplied on the command line.
pub struct JoinTarget {
    pub room_id: String,
    pub display_name: String,
    pub avatar_ref: Option<String>,
    pub role: String,
}

/// Run the client session: connect, join the room, then relay chat lines
/// from the REPL until the connection ends.
pub async fn run_client_session(url: &str, target: JoinTarget) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    let (mut write, mut read) = ws_stream.split();

    // The first event is the connected ack carrying our handle
    let my_handle = wait_for_connected_ack(&mut read).await?;
    print!("{}", MessageFormatter::format_connected(&my_handle));

    // Ask to join the room before handing the streams to the tasks
    let join = ClientEvent::JoinRoom {
        room_id: target.room_id.clone(),
        participant_info: ParticipantProfileDto {
            display_name: target.display_name.clone(),
            avatar_ref: target.avatar_ref,
            role: target.role,
        },
    };
    let join_json =
        serde_json::to_string(&join).map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    write
        .send(Message::Text(join_json.into()))
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    println!(
        "You are '{}' in room '{}'. Type messages and press Enter to send. Press Ctrl+C to exit.\n",
        target.display_name, target.room_id
    );

    let prompt_name = target.display_name.clone();
    let room_id = target.room_id.clone();
    let handle_for_read = my_handle.clone();
    let prompt_for_read = prompt_name.clone();

    // Spawn a task to render incoming events
    let mut read_task = tokio::spawn(async move {
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => {
                            print!("\n{}", render_event(&event, &handle_for_read));
                            redisplay_prompt(&prompt_for_read);
                        }
                        Err(e) => {
                            tracing::warn!("Unparseable server event: {} (raw: {})", e, text);
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => {}
            }
        }

        connection_error
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt_for_readline = prompt_name.clone();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", prompt_for_readline);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to turn input lines into chat events
    let mut write_task = tokio::spawn(async move {
        let mut write_error = false;

        while let Some(line) = input_rx.recv().await {
            let event = ClientEvent::ChatMessage {
                room_id: room_id.clone(),
                msg: serde_json::json!({
                    "text": line,
                    "sent_at": get_jst_timestamp(),
                }),
            };

            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                    continue;
                }
            };

            if let Err(e) = write.send(Message::Text(json.into())).await {
                tracing::warn!("Failed to send message: {}", e);
                write_error = true;
                break;
            }
        }

        write_error
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            if read_result.unwrap_or(true) {
                return Err(ClientError::ConnectionLost);
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            if write_result.unwrap_or(true) {
                return Err(ClientError::ConnectionLost);
            }
        }
    }

    Ok(())
}

/// Read frames until the connected ack arrives.
async fn wait_for_connected_ack<S>(read: &mut S) -> Result<String, ClientError>
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(message) = read.next().await {
        let message = message.map_err(|e| ClientError::ConnectionError(e.to_string()))?;
        if let Message::Text(text) = message {
            if let Ok(ServerEvent::Connected { connection_handle }) =
                serde_json::from_str::<ServerEvent>(&text)
            {
                return Ok(connection_handle);
            }
        }
    }
    Err(ClientError::MissingAck)
}

fn render_event(event: &ServerEvent, my_handle: &str) -> String {
    match event {
        ServerEvent::Connected { connection_handle } => {
            MessageFormatter::format_connected(connection_handle)
        }
        ServerEvent::RoomJoined { room_id } => MessageFormatter::format_room_joined(room_id),
        ServerEvent::RoomFull { room_id } => MessageFormatter::format_room_full(room_id),
        ServerEvent::PeerJoined {
            display_name, role, ..
        } => MessageFormatter::format_peer_joined(display_name, role),
        ServerEvent::PeerLeft {
            display_name, role, ..
        } => MessageFormatter::format_peer_left(display_name, role),
        ServerEvent::ParticipantsUpdate { participants, .. } => {
            MessageFormatter::format_participants(participants, my_handle)
        }
        ServerEvent::Signal {
            connection_handle,
            data,
            ..
        } => MessageFormatter::format_signal(connection_handle, data),
        ServerEvent::ChatMessage {
            connection_handle,
            msg,
            ..
        } => MessageFormatter::format_chat(connection_handle, msg),
    }
}

fn redisplay_prompt(display_name: &str) {
    print!("{}> ", display_name);
    let _ = std::io::stdout().flush();
}
