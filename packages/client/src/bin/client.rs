//! CLI client for the juku session room coordinator.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin juku-client -- --room booking-42 --name Alice --role tutor
//! ```

use clap::Parser;
use juku_client::session::{JoinTarget, run_client_session};
use juku_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "juku-client")]
#[command(about = "CLI client for the Juku session room coordinator", long_about = None)]
struct Args {
    /// WebSocket URL of the coordinator
    #[arg(short, long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Session room to join (derived from the booking id)
    #[arg(short, long)]
    room: String,

    /// Display name shown to the other participants
    #[arg(short, long)]
    name: String,

    /// Role label (free-form, e.g. "tutor" or "student")
    #[arg(long, default_value = "student")]
    role: String,

    /// Avatar reference shown to the other participants
    #[arg(long)]
    avatar: Option<String>,
}

#[tokio::main]
async fn main() {
    // Keep the REPL quiet by default; RUST_LOG overrides
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let args = Args::parse();

    let target = JoinTarget {
        room_id: args.room,
        display_name: args.name,
        avatar_ref: args.avatar,
        role: args.role,
    };

    if let Err(e) = run_client_session(&args.url, target).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
