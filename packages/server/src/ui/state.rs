//! Shared relay state handed to every session.

use std::sync::Arc;

use crate::{
    domain::{BroadcastPublisher, ModerationPolicy, NameRegistry},
    usecase::{JoinChatUseCase, LeaveChatUseCase, ListActiveNamesUseCase, RelayMessageUseCase},
};

/// Shared application state
pub struct AppState {
    /// JoinChatUseCase（名前取得のユースケース）
    pub join_chat_usecase: Arc<JoinChatUseCase>,
    /// RelayMessageUseCase（メッセージ中継のユースケース）
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
    /// LeaveChatUseCase（セッション終了のユースケース）
    pub leave_chat_usecase: Arc<LeaveChatUseCase>,
    /// ListActiveNamesUseCase（名前一覧取得のユースケース）
    pub list_active_names_usecase: Arc<ListActiveNamesUseCase>,
}

impl AppState {
    /// Wire every use case to the same registry, policy and publisher.
    pub fn new(
        registry: Arc<dyn NameRegistry>,
        policy: Arc<ModerationPolicy>,
        publisher: Arc<dyn BroadcastPublisher>,
    ) -> Self {
        Self {
            join_chat_usecase: Arc::new(JoinChatUseCase::new(
                registry.clone(),
                publisher.clone(),
            )),
            relay_message_usecase: Arc::new(RelayMessageUseCase::new(policy, publisher.clone())),
            leave_chat_usecase: Arc::new(LeaveChatUseCase::new(registry.clone(), publisher)),
            list_active_names_usecase: Arc::new(ListActiveNamesUseCase::new(registry)),
        }
    }
}
