//! UseCase: メッセージの検閲と中継
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayMessageUseCase::execute() と announce_expulsion() メソッド
//!
//! ### なぜこのテストが必要か
//! - 禁止語を含むメッセージが決してブロードキャストされないことを保証
//! - 3 回目の違反でのみ追放されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：許可されたメッセージの中継、ログアウト
//! - 異常系：禁止語を含むメッセージ、警告上限

use std::sync::Arc;

use crate::domain::{BroadcastPublisher, MessageAction, ModerationPolicy, Session, notice};

/// メッセージ中継のユースケース
pub struct RelayMessageUseCase {
    /// ModerationPolicy（禁止語フィルタ、読み取り専用）
    policy: Arc<ModerationPolicy>,
    /// BroadcastPublisher（全員への通知）
    publisher: Arc<dyn BroadcastPublisher>,
}

impl RelayMessageUseCase {
    /// 新しい RelayMessageUseCase を作成
    pub fn new(policy: Arc<ModerationPolicy>, publisher: Arc<dyn BroadcastPublisher>) -> Self {
        Self { policy, publisher }
    }

    /// 受信した一つのメッセージを処理する
    ///
    /// 許可されたメッセージはここでブロードキャストされる。送信者への私信
    /// （警告、終了シグナル）は呼び出し側が行う。
    ///
    /// # Returns
    ///
    /// * `Some(MessageAction)` - 呼び出し側が行うべき処理
    /// * `None` - セッションが Active ではないため処理しなかった
    pub async fn execute(&self, session: &mut Session, message: &str) -> Option<MessageAction> {
        let action = session.handle_message(message, &self.policy)?;

        if let MessageAction::Relay(line) = &action {
            self.publisher.publish(line).await;
        }

        Some(action)
    }

    /// 追放されたことを全員にブロードキャスト
    pub async fn announce_expulsion(&self, session: &Session) {
        if let Some(name) = session.name() {
            self.publisher.publish(&notice::expelled(name)).await;
        }
    }
}
