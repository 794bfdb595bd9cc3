//! 接続 → 現在のルームのインデックス
//!
//! 「1 接続は同時に 1 ルームまで」という中心的な不変条件を表現する
//! 明示的なインデックス。Lifecycle 層（UseCase）が Registry の変更と
//! 足並みを揃えて更新する。プロセス全体のグローバル状態にはせず、
//! テストごとに新規に構築できるようにする。

use std::collections::HashMap;

use tokio::sync::Mutex;

use super::value_object::{ConnectionId, RoomId};

/// 接続が現在どのルームに属しているかのインデックス
///
/// 各エントリはその接続を所有するタスクからのみ変更される。
#[derive(Debug, Default)]
pub struct ConnectionIndex {
    entries: Mutex<HashMap<ConnectionId, RoomId>>,
}

impl ConnectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続が現在属しているルームを取得
    pub async fn current_room(&self, connection_id: &ConnectionId) -> Option<RoomId> {
        let entries = self.entries.lock().await;
        entries.get(connection_id).cloned()
    }

    /// 接続の現在のルームを記録
    pub async fn assign(&self, connection_id: ConnectionId, room_id: RoomId) {
        let mut entries = self.entries.lock().await;
        entries.insert(connection_id, room_id);
    }

    /// 接続のエントリを削除し、属していたルームを返す
    ///
    /// すでにエントリがなければ `None`。切断処理の冪等性はこの戻り値で
    /// 判定する（イベントの回数ではなく接続ハンドルがキー）。
    pub async fn clear(&self, connection_id: &ConnectionId) -> Option<RoomId> {
        let mut entries = self.entries.lock().await;
        entries.remove(connection_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_assign_and_current_room() {
        // テスト項目: 接続にルームを割り当てると current_room で取得できる
        // given (前提条件):
        let index = ConnectionIndex::new();
        let connection_id = ConnectionId::generate();

        // when (操作):
        index.assign(connection_id, room("lesson-1")).await;

        // then (期待する結果):
        assert_eq!(index.current_room(&connection_id).await, Some(room("lesson-1")));
    }

    #[tokio::test]
    async fn test_assign_replaces_previous_room() {
        // テスト項目: 再割り当てで以前のルームが置き換えられる（同時所属はない）
        // given (前提条件):
        let index = ConnectionIndex::new();
        let connection_id = ConnectionId::generate();
        index.assign(connection_id, room("lesson-1")).await;

        // when (操作):
        index.assign(connection_id, room("lesson-2")).await;

        // then (期待する結果):
        assert_eq!(index.current_room(&connection_id).await, Some(room("lesson-2")));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        // テスト項目: clear は 2 回目以降 None を返す（切断処理の冪等性の根拠）
        // given (前提条件):
        let index = ConnectionIndex::new();
        let connection_id = ConnectionId::generate();
        index.assign(connection_id, room("lesson-1")).await;

        // when (操作):
        let first = index.clear(&connection_id).await;
        let second = index.clear(&connection_id).await;

        // then (期待する結果):
        assert_eq!(first, Some(room("lesson-1")));
        assert_eq!(second, None);
    }

    #[tokio::test]
    async fn test_current_room_for_unknown_connection() {
        // テスト項目: 未登録の接続の current_room は None
        // given (前提条件):
        let index = ConnectionIndex::new();

        // when (操作):
        let result = index.current_room(&ConnectionId::generate()).await;

        // then (期待する結果):
        assert_eq!(result, None);
    }
}
