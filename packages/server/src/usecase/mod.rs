//! UseCase 層（Connection Lifecycle Handler + Signal Relay）
//!
//! 接続ごとの状態遷移 `Disconnected → Connected(no room) → Connected(in room)`
//! を司る。「join する前に今のルームを leave する」という一番厄介な不変条件を
//! この層に集約することで、Registry は単純なデータ構造のままテストしやすく保つ。

pub mod disconnect_connection;
pub mod error;
pub mod get_participants;
pub mod join_room;
pub mod query_rooms;
pub mod relay;

use crate::domain::{Participant, RoomId};

pub use disconnect_connection::DisconnectConnectionUseCase;
pub use error::JoinRoomError;
pub use get_participants::GetParticipantsUseCase;
pub use join_room::{JoinRoomUseCase, JoinedRoom};
pub use query_rooms::QueryRoomsUseCase;
pub use relay::RelayUseCase;

/// 接続があるルームから離脱した結果
///
/// UI 層はこれをもとに、残っているメンバーへ peer-left と
/// participants-update を通知する。
#[derive(Debug, Clone, PartialEq)]
pub struct DepartedRoom {
    /// 離脱したルーム
    pub room_id: RoomId,
    /// 削除された参加者レコード
    pub departed: Participant,
    /// 離脱後にルームに残っている参加者（空ならルーム自体が消えている）
    pub remaining: Vec<Participant>,
}
