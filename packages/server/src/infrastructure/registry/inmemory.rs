//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//! HashMap をインメモリ台帳として使用します。
//!
//! 全状態はプロセスローカルかつ揮発性で、再起動時には空から再構築される。
//! 単一の Mutex がルームの台帳全体を保護し、各操作の間ロックを保持し続ける
//! ことで、呼び出し側からは各操作がアトミックに見える。
//! 空になったルームのエントリはその場で削除する。削除を怠ると
//! ルームの入れ替わりとともにメモリが際限なく増え続ける。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, JoinSnapshot, LeaveSnapshot, Participant, Room, RoomError, RoomId, RoomRegistry,
};

/// インメモリ Room Registry 実装
///
/// ルームは最初の参加者の join で暗黙に作成され、最後の参加者の leave で
/// 即座に削除される。
pub struct InMemoryRoomRegistry {
    /// ルーム ID → Room の台帳
    rooms: Mutex<HashMap<String, Room>>,
    /// 暗黙に作成されるルームの定員
    room_capacity: usize,
}

impl InMemoryRoomRegistry {
    /// デフォルト定員で新しい InMemoryRoomRegistry を作成
    pub fn new() -> Self {
        Self::with_room_capacity(crate::domain::entity::MAX_OCCUPANCY)
    }

    /// 定員を指定して新しい InMemoryRoomRegistry を作成
    pub fn with_room_capacity(room_capacity: usize) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            room_capacity,
        }
    }
}

impl Default for InMemoryRoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn join(
        &self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<JoinSnapshot, RoomError> {
        let mut rooms = self.rooms.lock().await;

        // ルームは最初の join で暗黙に作成される。created_at は最初の
        // メンバーの joined_at と一致する。
        let room = rooms.entry(room_id.as_str().to_string()).or_insert_with(|| {
            Room::with_capacity(room_id.clone(), participant.joined_at, self.room_capacity)
        });

        let newly_added = room.add_participant(participant)?;
        Ok(JoinSnapshot {
            participants: room.participants.clone(),
            newly_added,
        })
    }

    async fn leave(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Option<LeaveSnapshot> {
        let mut rooms = self.rooms.lock().await;

        let room = rooms.get_mut(room_id.as_str())?;
        let departed = room.remove_participant(connection_id)?;
        let remaining = room.participants.clone();

        if room.is_empty() {
            rooms.remove(room_id.as_str());
        }

        Some(LeaveSnapshot { departed, remaining })
    }

    async fn participants(&self, room_id: &RoomId) -> Vec<Participant> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id.as_str())
            .map(|room| room.participants.clone())
            .unwrap_or_default()
    }

    async fn rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        let mut snapshot: Vec<Room> = rooms.values().cloned().collect();
        // HashMap の順序は不定なので、一覧表示用に作成時刻で安定化する
        snapshot.sort_by_key(|room| (room.created_at, room.id.as_str().to_string()));
        snapshot
    }

    async fn room_count(&self) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ParticipantProfile, Timestamp};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryRoomRegistry の join / leave / participants 操作
    // - ルームの暗黙作成と、空になったルームの即時削除（GC）
    // - 定員チェックと冪等な再 join
    //
    // 【なぜこのテストが必要か】
    // - Registry は Lifecycle 層から呼ばれる台帳の中核
    // - 「空ルームの削除漏れ = メモリリーク」を防ぐ必要がある
    // - 複数ルームが互いに干渉しないことを保証する
    //
    // 【どのようなシナリオをテストするか】
    // 1. 最初の join でルームが作成される
    // 2. 定員超過の join が拒否され、状態が変わらない
    // 3. 最後の参加者の leave でルームが削除される
    // 4. 存在しないルームへの leave / participants が no-op
    // 5. 複数ルームの独立性
    // ========================================

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn participant(name: &str, at: i64) -> Participant {
        Participant::new(
            ConnectionId::generate(),
            ParticipantProfile {
                display_name: name.to_string(),
                avatar_ref: None,
                role: "student".to_string(),
            },
            Timestamp::new(at),
        )
    }

    #[tokio::test]
    async fn test_join_creates_room_implicitly() {
        // テスト項目: 最初の join でルームが暗黙に作成される
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        assert_eq!(registry.room_count().await, 0);

        // when (操作):
        let snapshot = registry
            .join(&room("lesson-1"), participant("alice", 1000))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(snapshot.newly_added);
        assert_eq!(snapshot.participants.len(), 1);
        assert_eq!(registry.room_count().await, 1);

        let rooms = registry.rooms().await;
        assert_eq!(rooms[0].created_at, Timestamp::new(1000));
    }

    #[tokio::test]
    async fn test_join_preserves_arrival_order() {
        // テスト項目: 参加者リストが join 順で返される
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let lesson = room("lesson-1");

        // when (操作):
        registry.join(&lesson, participant("charlie", 1000)).await.unwrap();
        registry.join(&lesson, participant("alice", 2000)).await.unwrap();
        let snapshot = registry.join(&lesson, participant("bob", 3000)).await.unwrap();

        // then (期待する結果): ID 順ではなく到着順
        let names: Vec<&str> = snapshot
            .participants
            .iter()
            .map(|p| p.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["charlie", "alice", "bob"]);
    }

    #[tokio::test]
    async fn test_join_rejects_fifth_participant() {
        // テスト項目: 定員 4 のルームへの 5 人目の join が拒否され、状態は変わらない
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let lesson = room("lesson-1");
        for i in 0..4 {
            registry
                .join(&lesson, participant(&format!("member-{i}"), 1000 + i))
                .await
                .unwrap();
        }

        // when (操作):
        let result = registry.join(&lesson, participant("late-comer", 5000)).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RoomError::Full { .. })));
        assert_eq!(registry.participants(&lesson).await.len(), 4);
    }

    #[tokio::test]
    async fn test_rejected_participant_can_join_after_a_leave() {
        // テスト項目: 拒否された接続も、誰かの leave 後のリトライで join できる
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let lesson = room("lesson-1");
        let first = participant("member-0", 1000);
        let first_id = first.connection_id;
        registry.join(&lesson, first).await.unwrap();
        for i in 1..4 {
            registry
                .join(&lesson, participant(&format!("member-{i}"), 1000 + i))
                .await
                .unwrap();
        }
        let late_comer = participant("late-comer", 5000);
        assert!(registry.join(&lesson, late_comer.clone()).await.is_err());

        // when (操作): 1 人 leave してからリトライ
        registry.leave(&lesson, &first_id).await.unwrap();
        let retry = registry.join(&lesson, late_comer).await;

        // then (期待する結果):
        assert!(retry.is_ok());
        assert_eq!(registry.participants(&lesson).await.len(), 4);
    }

    #[tokio::test]
    async fn test_rejoin_is_idempotent() {
        // テスト項目: 既存メンバーの再 join は newly_added = false で成功する
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let lesson = room("lesson-1");
        let alice = participant("alice", 1000);
        registry.join(&lesson, alice.clone()).await.unwrap();

        // when (操作):
        let snapshot = registry.join(&lesson, alice).await.unwrap();

        // then (期待する結果):
        assert!(!snapshot.newly_added);
        assert_eq!(snapshot.participants.len(), 1);
    }

    #[tokio::test]
    async fn test_leave_removes_empty_room() {
        // テスト項目: 最後の参加者の leave でルームが台帳から削除される
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let lesson = room("lesson-1");
        let alice = participant("alice", 1000);
        let alice_id = alice.connection_id;
        registry.join(&lesson, alice).await.unwrap();
        assert_eq!(registry.room_count().await, 1);

        // when (操作):
        let snapshot = registry.leave(&lesson, &alice_id).await.unwrap();

        // then (期待する結果): ルーム自体が消え、その後の participants は空リスト
        assert_eq!(snapshot.remaining.len(), 0);
        assert_eq!(registry.room_count().await, 0);
        assert_eq!(registry.participants(&lesson).await.len(), 0);
    }

    #[tokio::test]
    async fn test_leave_returns_departed_record_and_remaining() {
        // テスト項目: leave が削除されたレコードと残りのメンバーを返す
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let lesson = room("lesson-1");
        let alice = participant("alice", 1000);
        let alice_id = alice.connection_id;
        registry.join(&lesson, alice).await.unwrap();
        registry.join(&lesson, participant("bob", 2000)).await.unwrap();

        // when (操作):
        let snapshot = registry.leave(&lesson, &alice_id).await.unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.departed.display_name, "alice");
        assert_eq!(snapshot.remaining.len(), 1);
        assert_eq!(snapshot.remaining[0].display_name, "bob");
        assert_eq!(registry.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_leave_unknown_room_is_noop() {
        // テスト項目: 存在しないルームへの leave は None（エラーにならない）
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();

        // when (操作):
        let result = registry
            .leave(&room("no-such-room"), &ConnectionId::generate())
            .await;

        // then (期待する結果):
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_rooms_are_independent() {
        // テスト項目: 複数ルームのメンバーシップが互いに干渉しない
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let lesson_a = room("lesson-a");
        let lesson_b = room("lesson-b");
        let alice = participant("alice", 1000);
        let alice_id = alice.connection_id;

        // when (操作):
        registry.join(&lesson_a, alice).await.unwrap();
        registry.join(&lesson_b, participant("bob", 2000)).await.unwrap();
        registry.leave(&lesson_a, &alice_id).await.unwrap();

        // then (期待する結果): lesson-a だけが消える
        assert_eq!(registry.room_count().await, 1);
        assert_eq!(registry.participants(&lesson_b).await.len(), 1);
    }

    #[tokio::test]
    async fn test_custom_room_capacity() {
        // テスト項目: 設定された定員が暗黙作成されるルームに反映される
        // given (前提条件):
        let registry = InMemoryRoomRegistry::with_room_capacity(2);
        let lesson = room("lesson-1");

        // when (操作):
        registry.join(&lesson, participant("alice", 1000)).await.unwrap();
        registry.join(&lesson, participant("bob", 2000)).await.unwrap();
        let result = registry.join(&lesson, participant("charlie", 3000)).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RoomError::Full { .. })));
    }
}
