//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::RoomId;

use super::DepartedRoom;

/// join-room 処理のエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JoinRoomError {
    /// ルームが定員に達している
    ///
    /// 定員超過はリクエスタにのみ通知される。接続はそのまま使用可能で、
    /// 別のルームへの join を試みてよい。join に先立つ旧ルームからの離脱は
    /// すでに確定しているため、`departed` として持ち回る。
    #[error("room '{room_id}' is at capacity")]
    RoomFull {
        room_id: RoomId,
        departed: Option<DepartedRoom>,
    },
}
