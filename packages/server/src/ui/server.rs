//! Connection acceptor.

use std::{collections::HashMap, future::Future, net::SocketAddr, sync::Arc, time::Duration};

use tokio::{
    net::{TcpListener, TcpStream},
    sync::Mutex,
};

use crate::domain::SessionId;

use super::{error::ServerError, session::ClientSession, signal::shutdown_signal, state::AppState};

/// Pause after a failed accept so a persistent error (e.g. out of file
/// descriptors) does not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Sessions whose connection is still open, keyed by session id.
#[derive(Clone, Default)]
pub struct LiveSessions {
    inner: Arc<Mutex<HashMap<SessionId, SocketAddr>>>,
}

impl LiveSessions {
    async fn insert(&self, id: SessionId, peer: SocketAddr) {
        self.inner.lock().await.insert(id, peer);
    }

    async fn remove(&self, id: SessionId) {
        self.inner.lock().await.remove(&id);
    }

    pub async fn count(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Live sessions ordered by id.
    pub async fn snapshot(&self) -> Vec<(SessionId, SocketAddr)> {
        let sessions = self.inner.lock().await;
        let mut snapshot: Vec<_> = sessions.iter().map(|(id, peer)| (*id, *peer)).collect();
        snapshot.sort_by_key(|(id, _)| *id);
        snapshot
    }
}

/// Chat relay server
///
/// Accepts connections on the service port and runs one [`ClientSession`]
/// task per connection.
///
/// # Example
///
/// ```ignore
/// let server = Server::bind("127.0.0.1:2000", app_state).await?;
/// server.run_until_ctrl_c().await;
/// ```
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
    sessions: LiveSessions,
    next_session_id: u64,
}

impl Server {
    /// Bind the service port.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn bind(addr: &str, state: Arc<AppState>) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self::from_listener(listener, state))
    }

    pub fn from_listener(listener: TcpListener, state: Arc<AppState>) -> Self {
        Self {
            listener,
            state,
            sessions: LiveSessions::default(),
            next_session_id: 0,
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(ServerError::LocalAddr)
    }

    /// Handle to the live-session list; stays valid after the server stops.
    pub fn sessions(&self) -> LiveSessions {
        self.sessions.clone()
    }

    /// Accept connections until `shutdown` resolves, then close the
    /// listener. Sessions already running are left to finish on their own.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);

        match self.listener.local_addr() {
            Ok(addr) => tracing::info!("Chat relay listening on {}", addr),
            Err(e) => tracing::warn!("Chat relay listening on an unknown address: {}", e),
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_session(stream, peer).await,
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
            }
        }

        tracing::info!(
            "Listener closed; {} session(s) still running",
            self.sessions.count().await
        );
    }

    /// Run until Ctrl+C (or SIGTERM).
    pub async fn run_until_ctrl_c(self) {
        tracing::info!("Press Ctrl+C to shutdown gracefully");
        self.run_until(shutdown_signal()).await
    }

    async fn spawn_session(&mut self, stream: TcpStream, peer: SocketAddr) {
        self.next_session_id += 1;
        let id = SessionId::new(self.next_session_id);
        tracing::info!("Accepted connection from {} as session {}", peer, id);

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("Failed to set TCP_NODELAY for {}: {}", peer, e);
        }

        self.sessions.insert(id, peer).await;
        let (reader, writer) = stream.into_split();
        let session = ClientSession::new(id, reader, writer, self.state.clone());
        let sessions = self.sessions.clone();
        tokio::spawn(async move {
            session.run().await;
            sessions.remove(id).await;
            tracing::debug!("Session {} removed from the live list", id);
        });
    }
}
