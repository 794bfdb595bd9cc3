//! UseCase: 接続切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectConnectionUseCase::execute() メソッド
//! - 切断時のクリーンアップ（インデックス削除、Registry からの離脱、Pusher 登録解除）
//!
//! ### なぜこのテストが必要か
//! - 切断処理は接続ごとに正確に 1 回だけ実行される必要がある（冪等性）
//! - 最後の参加者の切断でルームが消えることを保証
//! - ルーム未所属の接続の切断もクラッシュしないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム所属中の接続の切断
//! - エッジケース：二重切断、ルーム未所属の切断、最後の参加者の切断

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionIndex, MessagePusher, RoomRegistry};

use super::DepartedRoom;

/// 接続切断のユースケース
///
/// 明示的な leave と transport レベルの切断の両方がここを通る。
/// クリーンアップの経路を 1 本にすることで、削除漏れと二重削除の双方を防ぐ。
pub struct DisconnectConnectionUseCase {
    /// Registry（ルーム台帳の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    pusher: Arc<dyn MessagePusher>,
    /// 接続 → 現在のルームのインデックス
    index: Arc<ConnectionIndex>,
}

impl DisconnectConnectionUseCase {
    /// 新しい DisconnectConnectionUseCase を作成
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        pusher: Arc<dyn MessagePusher>,
        index: Arc<ConnectionIndex>,
    ) -> Self {
        Self {
            registry,
            pusher,
            index,
        }
    }

    /// 接続切断を実行
    ///
    /// 冪等：切断イベントが複数回届いても、クリーンアップは接続ハンドルを
    /// キーに 1 回だけ実行される（2 回目以降はインデックスにエントリがなく
    /// 何もしない）。
    ///
    /// # Returns
    ///
    /// * `Some(DepartedRoom)` - ルーム所属中だった場合、離脱の結果
    /// * `None` - ルーム未所属だった、またはすでにクリーンアップ済み
    pub async fn execute(&self, connection_id: ConnectionId) -> Option<DepartedRoom> {
        // Pusher の登録解除は所属の有無によらず行う
        self.pusher.unregister_connection(&connection_id).await;

        let room_id = self.index.clear(&connection_id).await?;
        let snapshot = self.registry.leave(&room_id, &connection_id).await?;

        Some(DepartedRoom {
            room_id,
            departed: snapshot.departed,
            remaining: snapshot.remaining,
        })
    }

    /// 残っているメンバーにメッセージをブロードキャスト
    /// （peer-left / participants-update）
    pub async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        message: &str,
    ) -> Result<(), String> {
        self.pusher
            .broadcast(targets, message)
            .await
            .map_err(|e| e.to_string())
    }
}
