//! NameRegistry trait 定義
//!
//! セッション名の一意性を管理するインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{Nickname, SessionId};

/// One registered name, as returned by [`NameRegistry::list_active`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveName {
    /// Name as submitted by its owner
    pub name: Nickname,
    /// Session holding the name
    pub session_id: SessionId,
    /// Acquisition time (Unix milliseconds)
    pub acquired_at: i64,
}

/// Name Registry trait
///
/// 接続中セッションの名前集合。名前の比較は大文字小文字を区別しない。
///
/// ## 排他制御
///
/// - 全ての操作は互いに排他的で、確認と登録が他のセッションと交錯しない
/// - 実装はロックを各操作の内部でのみ保持し、呼び出し側の I/O をまたがない
#[async_trait]
pub trait NameRegistry: Send + Sync {
    /// 名前を取得する。既に使われている場合は `false`
    async fn try_acquire(&self, session_id: SessionId, name: &Nickname) -> bool;

    /// セッションが保持する名前を解放する。未登録なら何もしない
    ///
    /// 解放した名前を返す
    async fn release(&self, session_id: SessionId) -> Option<Nickname>;

    /// 登録中の名前のスナップショット（表示名順）
    async fn list_active(&self) -> Vec<ActiveName>;
}
