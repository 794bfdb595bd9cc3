//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - ルーム参加処理（旧ルームからの離脱、定員チェック、インデックス更新）
//!
//! ### なぜこのテストが必要か
//! - 「1 接続は同時に 1 ルームまで」という中心的な不変条件の検証
//! - 定員超過時に状態が変わらないことを保証
//! - 再 join の冪等性を保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規ルームへの参加、ルームの切り替え
//! - 異常系：定員超過（旧ルームからの離脱が先行しているケースを含む）
//! - エッジケース：同じルームへの再 join

use std::sync::Arc;

use juku_shared::time::Clock;

use crate::domain::{
    ConnectionId, ConnectionIndex, MessagePusher, Participant, ParticipantProfile, RoomError,
    RoomId, RoomRegistry, Timestamp,
};

use super::{DepartedRoom, error::JoinRoomError};

/// join-room 処理の結果
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRoom {
    /// 参加したルーム
    pub room_id: RoomId,
    /// join 後の参加者リスト（join 順、リクエスタ自身を含む）
    pub participants: Vec<Participant>,
    /// メンバーシップが実際に増えたか（再 join なら false）
    ///
    /// false のとき peer-joined はブロードキャストしない。
    pub newly_added: bool,
    /// join に先立って離脱した旧ルーム（あれば）
    pub departed: Option<DepartedRoom>,
}

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Registry（ルーム台帳の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    pusher: Arc<dyn MessagePusher>,
    /// 接続 → 現在のルームのインデックス
    index: Arc<ConnectionIndex>,
    /// joined_at の採番に使うクロック
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        pusher: Arc<dyn MessagePusher>,
        index: Arc<ConnectionIndex>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            pusher,
            index,
            clock,
        }
    }

    /// ルーム参加を実行
    ///
    /// 別のルームに所属中であれば、先にそのルームからの離脱を確定させてから
    /// join を試みる。一瞬たりとも 2 ルームに同時所属することはない。
    /// 定員超過で join できなかった場合、接続はルーム未所属のままになる
    /// （旧ルームへ戻りはしない）。
    ///
    /// # Returns
    ///
    /// * `Ok(JoinedRoom)` - 参加成功（通知に必要なスナップショット一式）
    /// * `Err(JoinRoomError::RoomFull)` - 定員超過（旧ルームからの離脱は確定済み）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        profile: ParticipantProfile,
    ) -> Result<JoinedRoom, JoinRoomError> {
        // 1. 別ルーム所属中なら、先に離脱を確定させる
        let departed = match self.index.current_room(&connection_id).await {
            Some(current) if current != room_id => {
                self.leave_current(connection_id, current).await
            }
            _ => None,
        };

        // 2. 参加者レコードを作成して Registry へ
        let joined_at = Timestamp::new(self.clock.now_jst_millis());
        let participant = Participant::new(connection_id, profile, joined_at);

        match self.registry.join(&room_id, participant).await {
            Ok(snapshot) => {
                // 3. Registry の変更と足並みを揃えてインデックスを更新
                self.index.assign(connection_id, room_id.clone()).await;
                Ok(JoinedRoom {
                    room_id,
                    participants: snapshot.participants,
                    newly_added: snapshot.newly_added,
                    departed,
                })
            }
            Err(RoomError::Full { .. }) => Err(JoinRoomError::RoomFull { room_id, departed }),
        }
    }

    /// 現在のルームからの離脱を確定させる
    async fn leave_current(
        &self,
        connection_id: ConnectionId,
        current: RoomId,
    ) -> Option<DepartedRoom> {
        self.index.clear(&connection_id).await;
        let snapshot = self.registry.leave(&current, &connection_id).await?;
        Some(DepartedRoom {
            room_id: current,
            departed: snapshot.departed,
            remaining: snapshot.remaining,
        })
    }

    /// リクエスタにメッセージを送信（room-joined / room-full）
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

    /// 対象の接続群にメッセージをブロードキャスト
    /// （peer-joined / peer-left / participants-update）
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, registry::InMemoryRoomRegistry,
    };
    use juku_shared::time::FixedClock;

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn profile(name: &str) -> ParticipantProfile {
        ParticipantProfile {
            display_name: name.to_string(),
            avatar_ref: None,
            role: "student".to_string(),
        }
    }

    struct Fixture {
        usecase: JoinRoomUseCase,
        registry: Arc<InMemoryRoomRegistry>,
        index: Arc<ConnectionIndex>,
    }

    fn create_fixture() -> Fixture {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let index = Arc::new(ConnectionIndex::new());
        let usecase = JoinRoomUseCase::new(
            registry.clone(),
            Arc::new(WebSocketMessagePusher::new()),
            index.clone(),
            Arc::new(FixedClock::new(1700000000000)),
        );
        Fixture {
            usecase,
            registry,
            index,
        }
    }

    #[tokio::test]
    async fn test_join_first_member() {
        // テスト項目: 最初のメンバーとして参加でき、インデックスが更新される
        // given (前提条件):
        let fixture = create_fixture();
        let alice = ConnectionId::generate();

        // when (操作):
        let result = fixture
            .usecase
            .execute(alice, room("lesson-1"), profile("alice"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(result.newly_added);
        assert_eq!(result.departed, None);
        assert_eq!(result.participants.len(), 1);
        assert_eq!(result.participants[0].connection_id, alice);
        assert_eq!(result.participants[0].joined_at.value(), 1700000000000);
        assert_eq!(
            fixture.index.current_room(&alice).await,
            Some(room("lesson-1"))
        );
    }

    #[tokio::test]
    async fn test_join_switches_rooms() {
        // テスト項目: 別ルームへの join で旧ルームからの離脱が先に確定する
        // given (前提条件):
        let fixture = create_fixture();
        let alice = ConnectionId::generate();
        let bob = ConnectionId::generate();
        fixture
            .usecase
            .execute(alice, room("lesson-a"), profile("alice"))
            .await
            .unwrap();
        fixture
            .usecase
            .execute(bob, room("lesson-a"), profile("bob"))
            .await
            .unwrap();

        // when (操作): bob がルームを切り替える
        let result = fixture
            .usecase
            .execute(bob, room("lesson-b"), profile("bob"))
            .await
            .unwrap();

        // then (期待する結果): lesson-b のメンバーであり、lesson-a のメンバーではない
        let departed = result.departed.unwrap();
        assert_eq!(departed.room_id, room("lesson-a"));
        assert_eq!(departed.departed.connection_id, bob);
        assert_eq!(departed.remaining.len(), 1);
        assert_eq!(departed.remaining[0].connection_id, alice);

        assert!(
            !fixture
                .registry
                .participants(&room("lesson-a"))
                .await
                .iter()
                .any(|p| p.connection_id == bob)
        );
        assert_eq!(
            fixture.index.current_room(&bob).await,
            Some(room("lesson-b"))
        );
    }

    #[tokio::test]
    async fn test_switching_out_of_sole_membership_removes_room() {
        // テスト項目: 唯一のメンバーがルームを切り替えると旧ルームが消える
        // given (前提条件):
        let fixture = create_fixture();
        let alice = ConnectionId::generate();
        fixture
            .usecase
            .execute(alice, room("lesson-a"), profile("alice"))
            .await
            .unwrap();

        // when (操作):
        let result = fixture
            .usecase
            .execute(alice, room("lesson-b"), profile("alice"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(result.departed.unwrap().remaining.len(), 0);
        assert_eq!(fixture.registry.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_rejoin_same_room_is_idempotent() {
        // テスト項目: 同じルームへの再 join は no-op で成功し、離脱は起きない
        // given (前提条件):
        let fixture = create_fixture();
        let alice = ConnectionId::generate();
        fixture
            .usecase
            .execute(alice, room("lesson-1"), profile("alice"))
            .await
            .unwrap();

        // when (操作):
        let result = fixture
            .usecase
            .execute(alice, room("lesson-1"), profile("alice"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(!result.newly_added);
        assert_eq!(result.departed, None);
        assert_eq!(result.participants.len(), 1);
    }

    #[tokio::test]
    async fn test_join_full_room_is_rejected() {
        // テスト項目: 定員 4 のルームへの 5 人目が RoomFull となり、所属なしのままになる
        // given (前提条件):
        let fixture = create_fixture();
        for i in 0..4 {
            fixture
                .usecase
                .execute(
                    ConnectionId::generate(),
                    room("lesson-1"),
                    profile(&format!("member-{i}")),
                )
                .await
                .unwrap();
        }
        let late_comer = ConnectionId::generate();

        // when (操作):
        let result = fixture
            .usecase
            .execute(late_comer, room("lesson-1"), profile("late-comer"))
            .await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(JoinRoomError::RoomFull { departed: None, .. })
        ));
        assert_eq!(
            fixture.registry.participants(&room("lesson-1")).await.len(),
            4
        );
        assert_eq!(fixture.index.current_room(&late_comer).await, None);
    }

    #[tokio::test]
    async fn test_rejected_connection_can_retry_after_a_leave() {
        // テスト項目: 拒否された接続は、空きができたあとのリトライで join できる
        // given (前提条件):
        let fixture = create_fixture();
        let first = ConnectionId::generate();
        fixture
            .usecase
            .execute(first, room("lesson-1"), profile("member-0"))
            .await
            .unwrap();
        for i in 1..4 {
            fixture
                .usecase
                .execute(
                    ConnectionId::generate(),
                    room("lesson-1"),
                    profile(&format!("member-{i}")),
                )
                .await
                .unwrap();
        }
        let late_comer = ConnectionId::generate();
        assert!(
            fixture
                .usecase
                .execute(late_comer, room("lesson-1"), profile("late-comer"))
                .await
                .is_err()
        );

        // when (操作): 先客がルームを移って空きができてからリトライ
        fixture
            .usecase
            .execute(first, room("lesson-2"), profile("member-0"))
            .await
            .unwrap();
        let retry = fixture
            .usecase
            .execute(late_comer, room("lesson-1"), profile("late-comer"))
            .await;

        // then (期待する結果):
        assert!(retry.is_ok());
        assert_eq!(
            fixture.registry.participants(&room("lesson-1")).await.len(),
            4
        );
    }

    #[tokio::test]
    async fn test_room_full_still_reports_departure_from_previous_room() {
        // テスト項目: 定員超過でも旧ルームからの離脱は確定し、結果に含まれる
        // given (前提条件):
        let fixture = create_fixture();
        let alice = ConnectionId::generate();
        fixture
            .usecase
            .execute(alice, room("lesson-a"), profile("alice"))
            .await
            .unwrap();
        for i in 0..4 {
            fixture
                .usecase
                .execute(
                    ConnectionId::generate(),
                    room("lesson-b"),
                    profile(&format!("member-{i}")),
                )
                .await
                .unwrap();
        }

        // when (操作): alice が満員の lesson-b へ移ろうとする
        let result = fixture
            .usecase
            .execute(alice, room("lesson-b"), profile("alice"))
            .await;

        // then (期待する結果): 離脱は確定、alice はどのルームにも属さない
        match result {
            Err(JoinRoomError::RoomFull { room_id, departed }) => {
                assert_eq!(room_id, room("lesson-b"));
                let departed = departed.unwrap();
                assert_eq!(departed.room_id, room("lesson-a"));
                assert_eq!(departed.remaining.len(), 0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(fixture.index.current_room(&alice).await, None);
        assert_eq!(fixture.registry.room_count().await, 1);
    }
}
