//! UseCase: シグナリング / チャットの中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayUseCase::relay_signal() / relay_chat() メソッド
//! - 中継対象の選定（送信者を除くルームの現メンバー）
//!
//! ### なぜこのテストが必要か
//! - 中継は「中継時点のメンバー」に正確に届く必要がある（後から join した
//!   メンバーへのバッファリングはしない）
//! - 存在しないルームへの中継が no-op であることを保証
//! - 送信者自身にエコーバックされないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数メンバーへの中継
//! - エッジケース：送信者のみのルーム、存在しないルーム

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomId, RoomRegistry};

/// シグナリング / チャット中継のユースケース
///
/// ペイロードは不透明で、解析も検証も永続化もしない。relay_signal と
/// relay_chat は意味的に別のトラフィックなので入口を分けているが、
/// 中継のメカニクスは同一。配送はベストエフォート・at-most-once。
pub struct RelayUseCase {
    /// Registry（ルーム台帳の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    pusher: Arc<dyn MessagePusher>,
}

impl RelayUseCase {
    /// 新しい RelayUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { registry, pusher }
    }

    /// シグナリングペイロードをルームの他メンバーへ中継
    ///
    /// # Returns
    ///
    /// 中継対象となった接続ハンドルのリスト（ログ・テスト用）
    pub async fn relay_signal(
        &self,
        room_id: &RoomId,
        sender: &ConnectionId,
        message: &str,
    ) -> Vec<ConnectionId> {
        self.fan_out(room_id, sender, message).await
    }

    /// チャットメッセージをルームの他メンバーへ中継
    pub async fn relay_chat(
        &self,
        room_id: &RoomId,
        sender: &ConnectionId,
        message: &str,
    ) -> Vec<ConnectionId> {
        self.fan_out(room_id, sender, message).await
    }

    /// 中継時点のメンバー（送信者を除く）へ配送する
    ///
    /// 存在しないルーム・メンバーのいないルームへの中継は黙って成功する。
    async fn fan_out(
        &self,
        room_id: &RoomId,
        sender: &ConnectionId,
        message: &str,
    ) -> Vec<ConnectionId> {
        let targets: Vec<ConnectionId> = self
            .registry
            .participants(room_id)
            .await
            .iter()
            .map(|p| p.connection_id)
            .filter(|id| id != sender)
            .collect();

        if targets.is_empty() {
            return targets;
        }

        if let Err(e) = self.pusher.broadcast(targets.clone(), message).await {
            tracing::warn!("Failed to relay message in room '{}': {}", room_id, e);
        }

        targets
    }
}
