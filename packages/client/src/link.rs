//! Connection to the relay.
//!
//! [`ServerLink`] owns the read side of the connection and drives the
//! client state machine:
//!
//! ```text
//! Connecting → AwaitingWelcome → AwaitingNameAcceptance → Active → Terminated
//! ```
//!
//! Name candidates and chat messages are written by the application through
//! a [`LinkHandle`]; the link only reads. Any I/O failure ends the link with
//! [`TerminationReason::ConnectionLost`].

use std::sync::Arc;

use tertulia_shared::{
    config::NetworkConfig,
    protocol::{TERMINATE_SESSION, read_frame, read_signal, write_frame},
};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpStream, tcp::OwnedReadHalf, tcp::OwnedWriteHalf},
    sync::{Mutex, Notify, oneshot, watch},
    task::JoinHandle,
};

use crate::{display::DisplaySink, error::ClientError, listener::BroadcastListener, notice};

/// Why a link stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The relay sent the termination sentinel
    ServerClosed,
    /// The connection could not be opened or failed
    ConnectionLost,
    /// The application closed the link through [`LinkHandle::close`]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    AwaitingWelcome,
    AwaitingNameAcceptance,
    Active,
    Terminated(TerminationReason),
}

impl LinkState {
    pub fn is_terminated(&self) -> bool {
        matches!(self, LinkState::Terminated(_))
    }
}

type SharedWriter = Arc<Mutex<Option<OwnedWriteHalf>>>;

/// Application-side handle: sends to the relay and observes link state.
#[derive(Clone)]
pub struct LinkHandle {
    writer: SharedWriter,
    sink: Arc<dyn DisplaySink>,
    state: watch::Receiver<LinkState>,
    cancel: Arc<Notify>,
}

impl LinkHandle {
    /// Send one framed string (a name candidate or a chat message).
    ///
    /// Failures are shown on the display sink, never returned.
    pub async fn send_to_server(&self, text: &str) {
        let mut writer = self.writer.lock().await;
        let Some(stream) = writer.as_mut() else {
            self.sink.append(notice::NOT_CONNECTED);
            return;
        };
        if let Err(e) = write_frame(stream, text).await {
            tracing::warn!("Failed to send to the relay: {}", e);
            self.sink.append(&notice::send_failed(&e));
        }
    }

    /// Whether the connection is currently open.
    pub fn is_connected(&self) -> bool {
        matches!(
            *self.state.borrow(),
            LinkState::AwaitingWelcome | LinkState::AwaitingNameAcceptance | LinkState::Active
        )
    }

    pub fn state(&self) -> LinkState {
        *self.state.borrow()
    }

    /// Ask the link to stop without waiting for the relay, e.g. when the
    /// user quits before a name was accepted.
    pub fn close(&self) {
        self.cancel.notify_one();
    }

    /// Watch channel carrying every state transition.
    pub fn subscribe(&self) -> watch::Receiver<LinkState> {
        self.state.clone()
    }

    /// Wait until the link reaches a state matching `predicate` and return
    /// it. Returns the last state if the link task is gone.
    pub async fn wait_for<F>(&self, predicate: F) -> LinkState
    where
        F: FnMut(&LinkState) -> bool,
    {
        let mut state = self.state.clone();
        let reached = state.wait_for(predicate).await.map(|reached| *reached);
        reached.unwrap_or_else(|_| *state.borrow())
    }

    /// Wait for access to be granted. `false` if the link terminated first.
    pub async fn wait_for_access(&self) -> bool {
        let reached = self
            .wait_for(|state| *state == LinkState::Active || state.is_terminated())
            .await;
        reached == LinkState::Active
    }

    /// Wait for the link to end.
    pub async fn wait_for_termination(&self) -> TerminationReason {
        match self.wait_for(LinkState::is_terminated).await {
            LinkState::Terminated(reason) => reason,
            _ => TerminationReason::ConnectionLost,
        }
    }
}

/// One connection to the relay.
pub struct ServerLink {
    config: NetworkConfig,
    sink: Arc<dyn DisplaySink>,
    writer: SharedWriter,
    state: watch::Sender<LinkState>,
    cancel: Arc<Notify>,
    listener: Option<(oneshot::Sender<()>, JoinHandle<()>)>,
}

impl ServerLink {
    pub fn new(config: NetworkConfig, sink: Arc<dyn DisplaySink>) -> (Self, LinkHandle) {
        let writer: SharedWriter = Arc::new(Mutex::new(None));
        let (state_tx, state_rx) = watch::channel(LinkState::Connecting);
        let cancel = Arc::new(Notify::new());
        let handle = LinkHandle {
            writer: writer.clone(),
            sink: sink.clone(),
            state: state_rx,
            cancel: cancel.clone(),
        };
        let link = Self {
            config,
            sink,
            writer,
            state: state_tx,
            cancel,
            listener: None,
        };
        (link, handle)
    }

    /// Drive the link until the relay ends the session or the connection
    /// fails, then release the connection and stop the listener.
    pub async fn run(mut self) -> TerminationReason {
        let cancel = self.cancel.clone();
        let outcome = tokio::select! {
            result = self.drive() => Some(result),
            _ = cancel.notified() => None,
        };

        let reason = match outcome {
            Some(Ok(())) => {
                tracing::info!("Session ended by the relay");
                self.sink.append(notice::CONNECTION_ENDED);
                TerminationReason::ServerClosed
            }
            Some(Err(e)) => {
                tracing::warn!("{}", e);
                self.sink.append(notice::CONNECTION_LOST);
                TerminationReason::ConnectionLost
            }
            None => {
                tracing::info!("Link closed by the application");
                TerminationReason::Cancelled
            }
        };

        if let Some(mut stream) = self.writer.lock().await.take() {
            stream.shutdown().await.ok();
        }
        if let Some((shutdown, handle)) = self.listener.take() {
            shutdown.send(()).ok();
            handle.await.ok();
        }

        self.set_state(LinkState::Terminated(reason));
        reason
    }

    async fn drive(&mut self) -> Result<(), ClientError> {
        let addr = self.config.server_addr();
        self.set_state(LinkState::Connecting);
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|source| ClientError::Connection {
                addr: addr.clone(),
                source,
            })?;
        tracing::info!("Connected to {}", addr);
        stream.set_nodelay(true).ok();
        let (mut reader, writer) = stream.into_split();
        *self.writer.lock().await = Some(writer);

        self.set_state(LinkState::AwaitingWelcome);
        let welcome = read_frame(&mut reader).await?;
        self.sink.append(&welcome);

        self.set_state(LinkState::AwaitingNameAcceptance);
        while !read_signal(&mut reader).await? {
            self.sink.append(notice::NAME_UNAVAILABLE);
        }

        self.start_listener().await;
        self.sink.append(notice::ACCESS_GRANTED);
        self.sink.append(notice::SEPARATOR);
        self.set_state(LinkState::Active);

        self.receive_messages(&mut reader).await
    }

    async fn receive_messages(&mut self, reader: &mut OwnedReadHalf) -> Result<(), ClientError> {
        loop {
            let message = read_frame(reader).await?;
            if message == TERMINATE_SESSION {
                return Ok(());
            }
            self.sink.append(&message);
        }
    }

    async fn start_listener(&mut self) {
        let group = self.config.broadcast_addr();
        match BroadcastListener::join(group, self.sink.clone()).await {
            Ok(listener) => {
                let (shutdown_tx, shutdown_rx) = oneshot::channel();
                let handle = listener.spawn(shutdown_rx);
                self.listener = Some((shutdown_tx, handle));
            }
            Err(e) => {
                tracing::warn!("Failed to join broadcast group {}: {}", group, e);
                self.sink.append(notice::BROADCAST_UNAVAILABLE);
            }
        }
    }

    fn set_state(&self, state: LinkState) {
        tracing::debug!("Link state: {:?}", state);
        self.state.send_replace(state);
    }
}
