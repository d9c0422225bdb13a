//! UseCase: 名前の取得と参加通知
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinChatUseCase::execute() と announce() メソッド
//!
//! ### なぜこのテストが必要か
//! - 名前の一意性（大文字小文字を区別しない）をハンドシェイクで保証する
//! - 参加通知がちょうど一回ブロードキャストされることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新しい名前の取得
//! - 異常系：使用中の名前、空の名前

use std::sync::Arc;

use crate::domain::{
    BroadcastPublisher, NameRegistry, Nickname, Session, SessionError, SessionState, notice,
};

use super::error::JoinError;

/// 名前取得のユースケース
pub struct JoinChatUseCase {
    /// NameRegistry（名前の一意性管理）
    registry: Arc<dyn NameRegistry>,
    /// BroadcastPublisher（全員への通知）
    publisher: Arc<dyn BroadcastPublisher>,
}

impl JoinChatUseCase {
    /// 新しい JoinChatUseCase を作成
    pub fn new(registry: Arc<dyn NameRegistry>, publisher: Arc<dyn BroadcastPublisher>) -> Self {
        Self {
            registry,
            publisher,
        }
    }

    /// 名前候補を検証して取得し、セッションを Active にする
    ///
    /// # Returns
    ///
    /// * `Ok(Nickname)` - 名前を取得した
    /// * `Err(JoinError)` - 候補が拒否された（クライアントは別の名前で再試行する）
    pub async fn execute(
        &self,
        session: &mut Session,
        candidate: String,
    ) -> Result<Nickname, JoinError> {
        if session.state() != SessionState::HandshakeWait {
            return Err(SessionError::InvalidTransition {
                state: session.state(),
                operation: "accept a name",
            }
            .into());
        }

        let name = Nickname::new(candidate)?;
        if !self.registry.try_acquire(session.id(), &name).await {
            return Err(JoinError::NameUnavailable(name.into_string()));
        }

        session.accept_name(name.clone())?;
        Ok(name)
    }

    /// 参加したことを全員にブロードキャスト
    pub async fn announce(&self, name: &Nickname) {
        self.publisher.publish(&notice::joined(name)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockBroadcastPublisher, SessionId},
        infrastructure::InMemoryNameRegistry,
    };

    fn create_usecase(
        publisher: MockBroadcastPublisher,
    ) -> (JoinChatUseCase, Arc<InMemoryNameRegistry>) {
        let registry = Arc::new(InMemoryNameRegistry::new());
        let usecase = JoinChatUseCase::new(registry.clone(), Arc::new(publisher));
        (usecase, registry)
    }

    #[tokio::test]
    async fn test_join_success() {
        // テスト項目: 未使用の名前でセッションが Active になる
        // given (前提条件):
        let (usecase, registry) = create_usecase(MockBroadcastPublisher::new());
        let mut session = Session::new(SessionId::new(1));

        // when (操作):
        let result = usecase.execute(&mut session, "Ana".to_string()).await;

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "Ana");
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(registry.list_active().await.len(), 1);
    }

    #[tokio::test]
    async fn test_join_with_name_in_other_case_is_rejected() {
        // テスト項目: "Ana" が使用中のとき "ana" は拒否され、セッションは待機を続ける
        // given (前提条件):
        let (usecase, _registry) = create_usecase(MockBroadcastPublisher::new());
        let mut ana = Session::new(SessionId::new(1));
        usecase.execute(&mut ana, "Ana".to_string()).await.unwrap();
        let mut other = Session::new(SessionId::new(2));

        // when (操作):
        let result = usecase.execute(&mut other, "ana".to_string()).await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinError::NameUnavailable("ana".to_string())));
        assert_eq!(other.state(), SessionState::HandshakeWait);
        assert_eq!(other.name(), None);
    }

    #[tokio::test]
    async fn test_join_with_blank_name_is_rejected() {
        // テスト項目: 空白のみの名前は登録されずに拒否される
        // given (前提条件):
        let (usecase, registry) = create_usecase(MockBroadcastPublisher::new());
        let mut session = Session::new(SessionId::new(1));

        // when (操作):
        let result = usecase.execute(&mut session, "  ".to_string()).await;

        // then (期待する結果):
        assert!(matches!(result, Err(JoinError::InvalidNickname(_))));
        assert!(registry.list_active().await.is_empty());
    }

    #[tokio::test]
    async fn test_active_session_cannot_take_second_name() {
        // テスト項目: Active なセッションは二つ目の名前を登録できない
        // given (前提条件):
        let (usecase, registry) = create_usecase(MockBroadcastPublisher::new());
        let mut session = Session::new(SessionId::new(1));
        usecase.execute(&mut session, "Ana".to_string()).await.unwrap();

        // when (操作):
        let result = usecase.execute(&mut session, "Bea".to_string()).await;

        // then (期待する結果):
        assert!(matches!(result, Err(JoinError::Session(_))));
        let active = registry.list_active().await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name.as_str(), "Ana");
        assert_eq!(session.name().unwrap().as_str(), "Ana");
    }

    #[tokio::test]
    async fn test_announce_publishes_join_notice_once() {
        // テスト項目: 参加通知がちょうど一回ブロードキャストされる
        // given (前提条件):
        let mut publisher = MockBroadcastPublisher::new();
        publisher
            .expect_publish()
            .withf(|message| message.contains("Ana joined the chat"))
            .times(1)
            .returning(|_| ());
        let (usecase, _registry) = create_usecase(publisher);

        // when (操作):
        usecase
            .announce(&Nickname::new("Ana".to_string()).unwrap())
            .await;

        // then (期待する結果):
        // MockBroadcastPublisher が呼び出し回数を検証する
    }
}
