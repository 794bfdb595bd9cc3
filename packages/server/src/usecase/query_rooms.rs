//! UseCase: ルーム一覧・詳細照会処理（HTTP API 用）

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomRegistry};

/// ルーム照会のユースケース
pub struct QueryRoomsUseCase {
    /// Registry（ルーム台帳の抽象化）
    registry: Arc<dyn RoomRegistry>,
}

impl QueryRoomsUseCase {
    /// 新しい QueryRoomsUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// 現在存在する全ルームのスナップショットを取得
    pub async fn rooms(&self) -> Vec<Room> {
        self.registry.rooms().await
    }

    /// 指定したルームのスナップショットを取得
    pub async fn room_detail(&self, room_id: &RoomId) -> Option<Room> {
        self.registry
            .rooms()
            .await
            .into_iter()
            .find(|room| &room.id == room_id)
    }
}
