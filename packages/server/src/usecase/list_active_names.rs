//! UseCase: 接続中の名前一覧の取得
//!
//! 参加と退出のたびに現在の名前一覧をログに出力するために使います。

use std::sync::Arc;

use tertulia_shared::time::timestamp_to_rfc3339;

use crate::domain::{ActiveName, NameRegistry};

/// 名前一覧取得のユースケース
pub struct ListActiveNamesUseCase {
    /// NameRegistry（名前の一意性管理）
    registry: Arc<dyn NameRegistry>,
}

impl ListActiveNamesUseCase {
    /// 新しい ListActiveNamesUseCase を作成
    pub fn new(registry: Arc<dyn NameRegistry>) -> Self {
        Self { registry }
    }

    /// 登録中の名前のスナップショットを取得
    pub async fn execute(&self) -> Vec<ActiveName> {
        self.registry.list_active().await
    }

    /// 現在の名前一覧を info レベルでログ出力
    pub async fn log_roster(&self) {
        let active = self.execute().await;
        tracing::info!("Active names ({}): {}", active.len(), format_roster(&active));
    }
}

/// Render a roster as `name (since <rfc3339>)` entries separated by commas.
pub fn format_roster(active: &[ActiveName]) -> String {
    if active.is_empty() {
        return "(none)".to_string();
    }

    active
        .iter()
        .map(|entry| {
            format!(
                "{} (since {})",
                entry.name,
                timestamp_to_rfc3339(entry.acquired_at)
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}
