//! Per-connection driver.
//!
//! Runs the wire protocol for one accepted connection: welcome, name
//! handshake, then the message loop. The decisions themselves live in the
//! use cases; this module only moves frames and signals.

use std::{io, sync::Arc};

use tertulia_shared::protocol::{TERMINATE_SESSION, read_frame, write_frame, write_signal};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::domain::{CloseReport, MessageAction, Session, SessionId, notice};

use super::state::AppState;

/// One client connection and the session it carries.
pub struct ClientSession<R, W> {
    session: Session,
    reader: R,
    writer: W,
    state: Arc<AppState>,
}

impl<R, W> ClientSession<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(id: SessionId, reader: R, writer: W, state: Arc<AppState>) -> Self {
        Self {
            session: Session::new(id),
            reader,
            writer,
            state,
        }
    }

    /// Drive the connection until logout, expulsion or an I/O failure, then
    /// clean up exactly once.
    pub async fn run(mut self) -> Option<CloseReport> {
        let id = self.session.id();

        if let Err(e) = self.drive().await {
            tracing::info!("Session {} disconnected: {}", id, e);
            self.session.begin_termination();
        }

        if let Err(e) = self.writer.shutdown().await {
            tracing::debug!("Session {} failed to shut down its writer: {}", id, e);
        }

        let report = self
            .state
            .leave_chat_usecase
            .execute(&mut self.session)
            .await;
        if let Some(report) = &report {
            if let Some(name) = &report.leave_notice {
                tracing::info!("Session {} ('{}') closed", id, name);
                self.state.list_active_names_usecase.log_roster().await;
            } else {
                tracing::info!("Session {} closed before choosing a name", id);
            }
        }
        report
    }

    async fn drive(&mut self) -> io::Result<()> {
        write_frame(&mut self.writer, notice::WELCOME).await?;
        self.negotiate_name().await?;
        self.relay_messages().await
    }

    async fn negotiate_name(&mut self) -> io::Result<()> {
        let id = self.session.id();
        loop {
            let candidate = read_frame(&mut self.reader).await?;
            match self
                .state
                .join_chat_usecase
                .execute(&mut self.session, candidate)
                .await
            {
                Ok(name) => {
                    // Announce before the signal so a failed write still
                    // leaves a join to pair with the leave notice.
                    tracing::info!("Session {} joined as '{}'", id, name);
                    self.state.join_chat_usecase.announce(&name).await;
                    self.state.list_active_names_usecase.log_roster().await;
                    write_signal(&mut self.writer, true).await?;
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!("Session {} name rejected: {}", id, e);
                    write_signal(&mut self.writer, false).await?;
                }
            }
        }
    }

    async fn relay_messages(&mut self) -> io::Result<()> {
        let id = self.session.id();
        loop {
            let message = read_frame(&mut self.reader).await?;
            let Some(action) = self
                .state
                .relay_message_usecase
                .execute(&mut self.session, &message)
                .await
            else {
                return Ok(());
            };

            match action {
                MessageAction::Relay(line) => {
                    tracing::debug!("Session {} relayed: {}", id, line);
                }
                MessageAction::Warn { warnings } => {
                    tracing::info!("Session {} warned ({} so far)", id, warnings);
                    write_frame(&mut self.writer, &notice::warning(warnings)).await?;
                }
                MessageAction::Logout => {
                    tracing::info!("Session {} logged out", id);
                    write_frame(&mut self.writer, TERMINATE_SESSION).await?;
                    return Ok(());
                }
                MessageAction::Expel { warnings } => {
                    tracing::warn!("Session {} blocked after {} warnings", id, warnings);
                    // The expulsion is public even if the private notices fail.
                    let notified = self.send_block_notices(warnings).await;
                    self.state
                        .relay_message_usecase
                        .announce_expulsion(&self.session)
                        .await;
                    notified?;
                    write_frame(&mut self.writer, TERMINATE_SESSION).await?;
                    return Ok(());
                }
            }
        }
    }

    async fn send_block_notices(&mut self, warnings: u32) -> io::Result<()> {
        write_frame(&mut self.writer, &notice::warning(warnings)).await?;
        write_frame(&mut self.writer, notice::BLOCKED).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{BroadcastPublisher, ModerationPolicy, NameRegistry, Nickname},
        infrastructure::InMemoryNameRegistry,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tertulia_shared::protocol::{LOGOUT_COMMAND, read_signal};
    use tokio::{
        io::{DuplexStream, duplex, split},
        task::JoinHandle,
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 接続ごとのプロトコル（ウェルカム、名前交渉、メッセージループ）
    // - ログアウト・追放・切断のどの経路でも後始末が一度だけ行われること
    //
    // 【どうやってテストするか】
    // - tokio::io::duplex でクライアント側を模擬し、ブロードキャストは記録する
    // ========================================

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<String>>,
    }

    impl RecordingPublisher {
        fn published(&self) -> Vec<String> {
            self.published.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BroadcastPublisher for RecordingPublisher {
        async fn publish(&self, message: &str) {
            self.published.lock().unwrap().push(message.to_string());
        }
    }

    struct Fixture {
        registry: Arc<InMemoryNameRegistry>,
        publisher: Arc<RecordingPublisher>,
        state: Arc<AppState>,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(InMemoryNameRegistry::new());
        let publisher = Arc::new(RecordingPublisher::default());
        let state = Arc::new(AppState::new(
            registry.clone(),
            Arc::new(ModerationPolicy::default()),
            publisher.clone(),
        ));
        Fixture {
            registry,
            publisher,
            state,
        }
    }

    fn start_session(
        state: &Arc<AppState>,
        id: u64,
    ) -> (JoinHandle<Option<CloseReport>>, DuplexStream) {
        let (server_side, client_side) = duplex(4096);
        let (reader, writer) = split(server_side);
        let session = ClientSession::new(SessionId::new(id), reader, writer, state.clone());
        (tokio::spawn(session.run()), client_side)
    }

    async fn join_as(client: &mut DuplexStream, name: &str) {
        assert_eq!(read_frame(client).await.unwrap(), notice::WELCOME);
        write_frame(client, name).await.unwrap();
        assert!(read_signal(client).await.unwrap());
    }

    #[tokio::test]
    async fn test_handshake_accepts_name_and_announces_join() {
        // テスト項目: 名前が受理されると true が返り、参加通知が一回ブロードキャストされる
        // given (前提条件):
        let fixture = fixture();
        let (_handle, mut client) = start_session(&fixture.state, 1);

        // when (操作):
        join_as(&mut client, "Ana").await;
        write_frame(&mut client, "hola").await.unwrap();
        write_frame(&mut client, LOGOUT_COMMAND).await.unwrap();
        assert_eq!(read_frame(&mut client).await.unwrap(), TERMINATE_SESSION);

        // then (期待する結果):
        let published = fixture.publisher.published();
        assert_eq!(published[0], ">> Ana joined the chat.");
        assert_eq!(published[1], "Ana: hola");
    }

    #[tokio::test]
    async fn test_handshake_rejects_taken_name_until_free_one() {
        // テスト項目: 使用中の名前には false が返り、別の名前で再試行できる
        // given (前提条件):
        let fixture = fixture();
        let taken = Nickname::new("Ana".to_string()).unwrap();
        fixture.registry.try_acquire(SessionId::new(99), &taken).await;
        let (_handle, mut client) = start_session(&fixture.state, 1);
        assert_eq!(read_frame(&mut client).await.unwrap(), notice::WELCOME);

        // when (操作):
        write_frame(&mut client, "ana").await.unwrap();
        let first = read_signal(&mut client).await.unwrap();
        write_frame(&mut client, "   ").await.unwrap();
        let second = read_signal(&mut client).await.unwrap();
        write_frame(&mut client, "Bea").await.unwrap();
        let third = read_signal(&mut client).await.unwrap();

        // then (期待する結果):
        assert!(!first);
        assert!(!second);
        assert!(third);
        assert_eq!(fixture.registry.list_active().await.len(), 2);
    }

    #[tokio::test]
    async fn test_logout_terminates_once_and_releases_name() {
        // テスト項目: ログアウトで終了シグナルが一回送られ、退出通知は一回、名前は解放される
        // given (前提条件):
        let fixture = fixture();
        let (handle, mut client) = start_session(&fixture.state, 1);
        join_as(&mut client, "Ana").await;

        // when (操作):
        write_frame(&mut client, LOGOUT_COMMAND).await.unwrap();

        // then (期待する結果):
        assert_eq!(read_frame(&mut client).await.unwrap(), TERMINATE_SESSION);
        assert!(read_frame(&mut client).await.is_err());
        let report = handle.await.unwrap().unwrap();
        assert!(report.release_name);
        let left: Vec<String> = fixture
            .publisher
            .published()
            .into_iter()
            .filter(|line| line.contains("left the chat"))
            .collect();
        assert_eq!(left, vec![">> Ana left the chat.".to_string()]);
        assert!(fixture.registry.list_active().await.is_empty());
    }

    #[tokio::test]
    async fn test_third_forbidden_message_blocks_session() {
        // テスト項目: 3 回目の禁止語で警告・ブロック通知・終了シグナルが送られ、名前は保持される
        // given (前提条件):
        let fixture = fixture();
        let (handle, mut client) = start_session(&fixture.state, 1);
        join_as(&mut client, "Ana").await;

        // when (操作):
        for message in ["bimbo", "BIMBO", "Bimbo!", "after the block"] {
            write_frame(&mut client, message).await.unwrap();
        }

        // then (期待する結果):
        assert_eq!(read_frame(&mut client).await.unwrap(), notice::warning(1));
        assert_eq!(read_frame(&mut client).await.unwrap(), notice::warning(2));
        assert_eq!(read_frame(&mut client).await.unwrap(), notice::warning(3));
        assert_eq!(read_frame(&mut client).await.unwrap(), notice::BLOCKED);
        assert_eq!(read_frame(&mut client).await.unwrap(), TERMINATE_SESSION);
        let report = handle.await.unwrap().unwrap();
        assert!(!report.release_name);

        let published = fixture.publisher.published();
        assert!(!published.iter().any(|line| line.to_lowercase().contains("bimbo")));
        assert!(!published.iter().any(|line| line.contains("after the block")));
        assert!(published.contains(
            &">> Ana has been expelled and blocked for breaking the rules.".to_string()
        ));
        assert_eq!(fixture.registry.list_active().await.len(), 1);
    }

    #[tokio::test]
    async fn test_abrupt_disconnect_after_join_cleans_up() {
        // テスト項目: 参加後の切断でも退出通知と名前の解放が行われる
        // given (前提条件):
        let fixture = fixture();
        let (handle, mut client) = start_session(&fixture.state, 1);
        join_as(&mut client, "Ana").await;

        // when (操作):
        drop(client);

        // then (期待する結果):
        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.leave_notice.unwrap().as_str(), "Ana");
        assert!(fixture.registry.list_active().await.is_empty());
        assert_eq!(
            fixture.publisher.published().last().unwrap(),
            ">> Ana left the chat."
        );
    }

    #[tokio::test]
    async fn test_disconnect_during_handshake_is_silent() {
        // テスト項目: 名前が決まる前の切断では何もブロードキャストしない
        // given (前提条件):
        let fixture = fixture();
        let (handle, mut client) = start_session(&fixture.state, 1);
        assert_eq!(read_frame(&mut client).await.unwrap(), notice::WELCOME);

        // when (操作):
        drop(client);

        // then (期待する結果):
        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.leave_notice, None);
        assert!(fixture.publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_failed_acceptance_signal_keeps_join_and_leave_paired() {
        // テスト項目: 受理シグナルの送信に失敗しても、参加通知と退出通知が対になる
        // given (前提条件):
        let fixture = fixture();
        let (handle, mut client) = start_session(&fixture.state, 1);
        assert_eq!(read_frame(&mut client).await.unwrap(), notice::WELCOME);

        // when (操作):
        write_frame(&mut client, "Ana").await.unwrap();
        drop(client);

        // then (期待する結果):
        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.leave_notice.unwrap().as_str(), "Ana");
        assert!(fixture.registry.list_active().await.is_empty());
        assert_eq!(
            fixture.publisher.published(),
            vec![
                ">> Ana joined the chat.".to_string(),
                ">> Ana left the chat.".to_string(),
            ]
        );
    }
}
