//! 値オブジェクト定義
//!
//! RoomId / ConnectionId / Timestamp の newtype を定義します。
//! ドメイン層の境界で一度だけ検証し、以降は型で正しさを保証します。

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RoomId の最大長（上流の予約 ID 由来の文字列を想定）
const ROOM_ID_MAX_LEN: usize = 128;

/// セッションルームの識別子
///
/// クライアントから渡される不透明な文字列。内容は解釈しない。
/// 空文字列と極端に長い文字列のみ拒否する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    /// 新しい RoomId を作成（検証付き）
    pub fn new(value: String) -> Result<Self, String> {
        if value.is_empty() {
            return Err("room id must not be empty".to_string());
        }
        if value.len() > ROOM_ID_MAX_LEN {
            return Err(format!("room id must be at most {ROOM_ID_MAX_LEN} bytes"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 接続ハンドル
///
/// ライブな接続ごとに一意。ユーザー単位ではなく接続単位なので、
/// 再接続したユーザーは新しい ConnectionId を持つ（論理的に別の参加者）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// 新しい ConnectionId をサーバー側で生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// タイムスタンプ（JST、ミリ秒）
///
/// 表示順序の参考情報であり、正しさの不変条件には使われない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
