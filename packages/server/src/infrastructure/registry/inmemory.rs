//! InMemory NameRegistry 実装
//!
//! ドメイン層が定義する NameRegistry trait の具体的な実装。
//! 正規化した名前（小文字）をキーとする HashMap を単一の Mutex で保護します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tertulia_shared::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::domain::{ActiveName, NameRegistry, Nickname, SessionId};

/// インメモリ NameRegistry 実装
pub struct InMemoryNameRegistry {
    /// 正規化した名前 → 登録情報
    names: Mutex<HashMap<String, ActiveName>>,
    /// 取得時刻の記録に使う時計
    clock: Arc<dyn Clock>,
}

impl InMemoryNameRegistry {
    /// システム時計を使う NameRegistry を作成
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// 任意の時計を使う NameRegistry を作成（テスト用）
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            names: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

impl Default for InMemoryNameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NameRegistry for InMemoryNameRegistry {
    async fn try_acquire(&self, session_id: SessionId, name: &Nickname) -> bool {
        let mut names = self.names.lock().await;
        let key = name.key();
        if names.contains_key(&key) {
            tracing::debug!("Name '{}' is already taken", name);
            return false;
        }

        names.insert(
            key,
            ActiveName {
                name: name.clone(),
                session_id,
                acquired_at: self.clock.now_millis(),
            },
        );
        tracing::debug!("Name '{}' acquired by session {}", name, session_id);
        true
    }

    async fn release(&self, session_id: SessionId) -> Option<Nickname> {
        let mut names = self.names.lock().await;
        let key = names
            .iter()
            .find(|(_, entry)| entry.session_id == session_id)
            .map(|(key, _)| key.clone())?;
        let entry = names.remove(&key)?;
        tracing::debug!("Name '{}' released by session {}", entry.name, session_id);
        Some(entry.name)
    }

    async fn list_active(&self) -> Vec<ActiveName> {
        let names = self.names.lock().await;
        let mut active: Vec<ActiveName> = names.values().cloned().collect();
        active.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        active
    }
}
