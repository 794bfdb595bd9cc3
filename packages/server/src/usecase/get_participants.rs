//! UseCase: 参加者リスト照会処理
//!
//! get-participants イベントへの応答。リクエスタだけに現時点の
//! スナップショットを返す（ブロードキャストはしない）。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, Participant, RoomId, RoomRegistry};

/// 参加者リスト照会のユースケース
pub struct GetParticipantsUseCase {
    /// Registry（ルーム台帳の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    pusher: Arc<dyn MessagePusher>,
}

impl GetParticipantsUseCase {
    /// 新しい GetParticipantsUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { registry, pusher }
    }

    /// 参加者リストを取得（join 順）
    ///
    /// 存在しないルームはエラーではなく空リスト。
    pub async fn execute(&self, room_id: &RoomId) -> Vec<Participant> {
        self.registry.participants(room_id).await
    }

    /// リクエスタにスナップショットを送信
    pub async fn push_to_requester(
        &self,
        connection_id: &ConnectionId,
        message: &str,
    ) -> Result<(), String> {
        self.pusher
            .push_to(connection_id, message)
            .await
            .map_err(|e| e.to_string())
    }
}
