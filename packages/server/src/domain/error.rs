//! ドメイン層のエラー定義

use thiserror::Error;

use super::value_object::RoomId;

/// Room 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// ルームが定員に達している
    #[error("room '{room_id}' is at capacity")]
    Full { room_id: RoomId },
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// 対象の接続が登録されていない
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),
    /// 送信チャンネルへの書き込みに失敗した
    #[error("failed to push message: {0}")]
    PushFailed(String),
}
