//! MessagePusher trait 定義
//!
//! ドメイン層が必要とするメッセージ通知のインターフェース。
//! 具体的な実装（WebSocket）は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::MessagePushError;
use super::value_object::ConnectionId;

/// 接続ごとの送信チャンネル
///
/// WebSocket の書き込みタスクへ JSON 文字列を渡す。
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
///
/// 接続ハンドルをキーに送信チャンネルを管理し、単一送信とブロードキャストを
/// 提供する。配送はベストエフォート・at-most-once：切断済みの接続への
/// 送信失敗は許容し、リトライしない。
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除
    async fn unregister_connection(&self, connection_id: &ConnectionId);

    /// 特定の接続にメッセージを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続にメッセージをブロードキャスト
    ///
    /// 一部の接続への送信失敗は許容する（戻り値はエラーにならない）。
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
