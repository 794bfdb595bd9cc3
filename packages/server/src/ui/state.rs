//! Server state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::MessagePusher;
use crate::usecase::{
    DisconnectConnectionUseCase, GetParticipantsUseCase, JoinRoomUseCase, QueryRoomsUseCase,
    RelayUseCase,
};

/// Shared application state
pub struct AppState {
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// DisconnectConnectionUseCase（接続切断のユースケース）
    pub disconnect_usecase: Arc<DisconnectConnectionUseCase>,
    /// RelayUseCase（シグナリング / チャット中継のユースケース）
    pub relay_usecase: Arc<RelayUseCase>,
    /// GetParticipantsUseCase（参加者リスト照会のユースケース）
    pub get_participants_usecase: Arc<GetParticipantsUseCase>,
    /// QueryRoomsUseCase（ルーム一覧・詳細照会のユースケース）
    pub query_rooms_usecase: Arc<QueryRoomsUseCase>,
    /// MessagePusher（接続登録と connected 応答に使用）
    pub pusher: Arc<dyn MessagePusher>,
    /// アイドル接続を切断するまでの時間（None なら無効）
    ///
    /// 明示的なオプトイン設定。デフォルトでは接続は leave か transport の
    /// 切断までルームの枠を占有し続ける。
    pub idle_timeout: Option<Duration>,
}
