//! Server execution logic.

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::domain::MessagePusher;
use crate::usecase::{
    DisconnectConnectionUseCase, GetParticipantsUseCase, JoinRoomUseCase, QueryRoomsUseCase,
    RelayUseCase,
};

use super::{
    handler::{
        http::{get_room_detail, get_rooms, health_check},
        websocket::websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Session room coordinator server
///
/// This struct encapsulates the wired use cases and provides a method to
/// run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     join_room_usecase,
///     disconnect_usecase,
///     relay_usecase,
///     get_participants_usecase,
///     query_rooms_usecase,
///     pusher,
///     None,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// JoinRoomUseCase（ルーム参加のユースケース）
    join_room_usecase: Arc<JoinRoomUseCase>,
    /// DisconnectConnectionUseCase（接続切断のユースケース）
    disconnect_usecase: Arc<DisconnectConnectionUseCase>,
    /// RelayUseCase（シグナリング / チャット中継のユースケース）
    relay_usecase: Arc<RelayUseCase>,
    /// GetParticipantsUseCase（参加者リスト照会のユースケース）
    get_participants_usecase: Arc<GetParticipantsUseCase>,
    /// QueryRoomsUseCase（ルーム一覧・詳細照会のユースケース）
    query_rooms_usecase: Arc<QueryRoomsUseCase>,
    /// MessagePusher（接続登録に使用）
    pusher: Arc<dyn MessagePusher>,
    /// アイドル接続を切断するまでの時間（None なら無効）
    idle_timeout: Option<Duration>,
}

impl Server {
    /// Create a new Server instance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        join_room_usecase: Arc<JoinRoomUseCase>,
        disconnect_usecase: Arc<DisconnectConnectionUseCase>,
        relay_usecase: Arc<RelayUseCase>,
        get_participants_usecase: Arc<GetParticipantsUseCase>,
        query_rooms_usecase: Arc<QueryRoomsUseCase>,
        pusher: Arc<dyn MessagePusher>,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            join_room_usecase,
            disconnect_usecase,
            relay_usecase,
            get_participants_usecase,
            query_rooms_usecase,
            pusher,
            idle_timeout,
        }
    }

    /// Run the session room coordinator server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address
    /// or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app_state = Arc::new(AppState {
            join_room_usecase: self.join_room_usecase,
            disconnect_usecase: self.disconnect_usecase,
            relay_usecase: self.relay_usecase,
            get_participants_usecase: self.get_participants_usecase,
            query_rooms_usecase: self.query_rooms_usecase,
            pusher: self.pusher,
            idle_timeout: self.idle_timeout,
        });

        // Define handlers
        let app = Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "Session room coordinator listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
