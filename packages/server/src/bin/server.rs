//! Session room coordinator server for live tutoring sessions.
//!
//! Tracks room membership, enforces occupancy and relays signaling / chat
//! payloads between the members of a room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin juku-server
//! PORT=3000 cargo run --bin juku-server -- --host 0.0.0.0
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use juku_server::{
    domain::ConnectionIndex,
    infrastructure::{message_pusher::WebSocketMessagePusher, registry::InMemoryRoomRegistry},
    ui::Server,
    usecase::{
        DisconnectConnectionUseCase, GetParticipantsUseCase, JoinRoomUseCase, QueryRoomsUseCase,
        RelayUseCase,
    },
};
use juku_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "juku-server")]
#[command(about = "Session room coordinator for live tutoring sessions", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Maximum number of participants per room
    #[arg(long, default_value = "4")]
    room_capacity: usize,

    /// Disconnect a connection after this many seconds without inbound
    /// events (disabled when not set)
    #[arg(long)]
    idle_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Registry + ConnectionIndex
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create Registry (in-memory room ledger) and the connection index
    let registry = Arc::new(InMemoryRoomRegistry::with_room_capacity(args.room_capacity));
    let index = Arc::new(ConnectionIndex::new());
    tracing::info!("Room registry created (capacity {} per room)", args.room_capacity);

    // 2. Create MessagePusher (WebSocket implementation)
    let pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let clock = Arc::new(SystemClock);
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        registry.clone(),
        pusher.clone(),
        index.clone(),
        clock,
    ));
    let disconnect_usecase = Arc::new(DisconnectConnectionUseCase::new(
        registry.clone(),
        pusher.clone(),
        index.clone(),
    ));
    let relay_usecase = Arc::new(RelayUseCase::new(registry.clone(), pusher.clone()));
    let get_participants_usecase =
        Arc::new(GetParticipantsUseCase::new(registry.clone(), pusher.clone()));
    let query_rooms_usecase = Arc::new(QueryRoomsUseCase::new(registry.clone()));

    // 4. Create and run the server
    let idle_timeout = args.idle_timeout_secs.map(Duration::from_secs);
    let server = Server::new(
        join_room_usecase,
        disconnect_usecase,
        relay_usecase,
        get_participants_usecase,
        query_rooms_usecase,
        pusher,
        idle_timeout,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
