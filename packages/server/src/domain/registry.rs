//! RoomRegistry trait 定義
//!
//! ドメイン層が必要とするルーム台帳へのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! Registry はルームと参加者の台帳だけを管理する。
//! 「1 接続は同時に 1 ルームまで」という不変条件は Registry ではなく
//! Lifecycle 層（UseCase + ConnectionIndex）の責務。

use async_trait::async_trait;

use super::entity::{Participant, Room};
use super::error::RoomError;
use super::value_object::{ConnectionId, RoomId};

/// join 操作の結果スナップショット
///
/// 変更をコミットしたロック区間内で採られた参加者リストなので、
/// このままブロードキャストしても中間状態が観測されることはない。
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSnapshot {
    /// join 後のルームの参加者リスト（join 順）
    pub participants: Vec<Participant>,
    /// この join で新規にメンバーが増えたか（再 join なら false）
    pub newly_added: bool,
}

/// leave 操作の結果スナップショット
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveSnapshot {
    /// 削除された参加者レコード
    pub departed: Participant,
    /// leave 後にルームに残っている参加者リスト（join 順）
    pub remaining: Vec<Participant>,
}

/// Room Registry trait
///
/// ルーム ID から接続中の参加者リストへの正規のマッピング。
/// 各操作は呼び出し側からアトミックに見えなければならない。
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// 参加者をルームに追加
    ///
    /// ルームが存在しなければ暗黙に作成する。すでにメンバーであれば
    /// 状態を変更せず成功を返す（冪等）。定員に達していれば
    /// `RoomError::Full` を返し、状態は変更しない。
    async fn join(
        &self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<JoinSnapshot, RoomError>;

    /// 参加者をルームから削除
    ///
    /// 参加者が空になったルームは即座に台帳から削除する。
    /// ルームまたは参加者が存在しない場合は `None`（エラーにはしない）。
    async fn leave(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Option<LeaveSnapshot>;

    /// ルームの参加者リストを取得（join 順）
    ///
    /// 存在しないルームは空リスト。常に最後にコミットされた状態を返す。
    async fn participants(&self, room_id: &RoomId) -> Vec<Participant>;

    /// 現在存在する全ルームのスナップショットを取得
    async fn rooms(&self) -> Vec<Room>;

    /// 現在存在するルーム数を取得
    async fn room_count(&self) -> usize;
}
