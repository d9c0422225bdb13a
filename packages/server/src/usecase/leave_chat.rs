//! UseCase: セッション終了処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveChatUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - どの経路（ログアウト、追放、切断）で終了しても後始末が一度だけ行われる
//! - ブロックされたセッションの名前は解放されない
//!
//! ### どのような状況を想定しているか
//! - 正常系：名前を持つセッションの終了
//! - エッジケース：ハンドシェイク前の終了、二重の終了、ブロック済みセッション

use std::sync::Arc;

use crate::domain::{BroadcastPublisher, CloseReport, NameRegistry, Session, notice};

/// セッション終了のユースケース
pub struct LeaveChatUseCase {
    /// NameRegistry（名前の解放）
    registry: Arc<dyn NameRegistry>,
    /// BroadcastPublisher（退出通知）
    publisher: Arc<dyn BroadcastPublisher>,
}

impl LeaveChatUseCase {
    /// 新しい LeaveChatUseCase を作成
    pub fn new(registry: Arc<dyn NameRegistry>, publisher: Arc<dyn BroadcastPublisher>) -> Self {
        Self {
            registry,
            publisher,
        }
    }

    /// セッションを閉じ、名前の解放と退出通知を行う
    ///
    /// # Returns
    ///
    /// * `Some(CloseReport)` - 今回の呼び出しで閉じた
    /// * `None` - 既に閉じていた（何もしない）
    pub async fn execute(&self, session: &mut Session) -> Option<CloseReport> {
        let report = session.close()?;

        if report.release_name {
            self.registry.release(report.session_id).await;
        }

        if let Some(name) = &report.leave_notice {
            self.publisher.publish(&notice::left(name)).await;
        }

        Some(report)
    }
}
