//! エンティティ定義
//!
//! セッションルーム（Room）と参加者（Participant）のドメインモデル。
//! Room は参加者を join 順で保持し、定員チェックと冪等な追加を担当する。
//! 「1 接続は同時に 1 ルームまで」という不変条件はここではなく
//! Lifecycle 層（UseCase + ConnectionIndex）が守る。

use serde::Serialize;

use super::error::RoomError;
use super::value_object::{ConnectionId, RoomId, Timestamp};

/// ルームの定員のデフォルト値
///
/// 講師 1 名 + 生徒最大 3 名のグループセッションを想定。
pub const MAX_OCCUPANCY: usize = 4;

/// 参加者のプロフィール（join-room イベントでクライアントが供給する）
///
/// display_name / avatar_ref / role はいずれも自由形式で、コアでは検証しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantProfile {
    pub display_name: String,
    pub avatar_ref: Option<String>,
    pub role: String,
}

/// ルーム内の参加者レコード
///
/// join 成功時に作成され、以後変更されない。接続が離脱・切断したときに破棄される。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub avatar_ref: Option<String>,
    pub role: String,
    pub joined_at: Timestamp,
}

impl Participant {
    /// プロフィールと接続ハンドルから参加者レコードを作成
    pub fn new(connection_id: ConnectionId, profile: ParticipantProfile, joined_at: Timestamp) -> Self {
        Self {
            connection_id,
            display_name: profile.display_name,
            avatar_ref: profile.avatar_ref,
            role: profile.role,
            joined_at,
        }
    }
}

/// セッションルーム
///
/// participants は Vec で保持し、挿入順 = join 順が外部に見える順序となる。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub participants: Vec<Participant>,
    pub capacity: usize,
    pub created_at: Timestamp,
}

impl Room {
    /// デフォルト定員のルームを作成
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self::with_capacity(id, created_at, MAX_OCCUPANCY)
    }

    /// 定員を指定してルームを作成
    pub fn with_capacity(id: RoomId, created_at: Timestamp, capacity: usize) -> Self {
        Self {
            id,
            participants: Vec::new(),
            capacity,
            created_at,
        }
    }

    /// 参加者を追加
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 新規に追加された
    /// * `Ok(false)` - すでにメンバーだった（冪等な再 join、状態は変更されない）
    /// * `Err(RoomError::Full)` - 定員に達している（状態は変更されない）
    ///
    /// メンバーシップの判定は定員チェックより先に行う。定員いっぱいの
    /// ルームへの再 join も成功として扱うため。
    pub fn add_participant(&mut self, participant: Participant) -> Result<bool, RoomError> {
        if self.contains(&participant.connection_id) {
            return Ok(false);
        }
        if self.participants.len() >= self.capacity {
            return Err(RoomError::Full {
                room_id: self.id.clone(),
            });
        }
        self.participants.push(participant);
        Ok(true)
    }

    /// 参加者を削除し、削除されたレコードを返す（存在しなければ None）
    pub fn remove_participant(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        let position = self
            .participants
            .iter()
            .position(|p| &p.connection_id == connection_id)?;
        Some(self.participants.remove(position))
    }

    /// 指定の接続がメンバーかどうか
    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.participants
            .iter()
            .any(|p| &p.connection_id == connection_id)
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn occupancy(&self) -> usize {
        self.participants.len()
    }
}
