//! Interactive client: terminal input feeding a [`ServerLink`].

use std::sync::Arc;

use rustyline::{DefaultEditor, error::ReadlineError};
use tertulia_shared::{config::NetworkConfig, protocol::LOGOUT_COMMAND};
use tokio::sync::{mpsc, oneshot};

use crate::{
    display::{DisplaySink, StdoutSink},
    error::ClientError,
    link::{LinkHandle, LinkState, ServerLink, TerminationReason},
};

const PROMPT: &str = "> ";

/// Run the chat client on the terminal until the link ends.
///
/// # Errors
///
/// Returns [`ClientError::Readline`] if the terminal editor cannot be set up.
pub async fn run_client(
    config: NetworkConfig,
    nickname: Option<String>,
) -> Result<TerminationReason, ClientError> {
    // Create channel for rustyline input
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();
    let (ready_tx, ready_rx) = oneshot::channel::<Result<(), ReadlineError>>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    std::thread::spawn(move || {
        let editor = match DefaultEditor::new() {
            Ok(editor) => {
                ready_tx.send(Ok(())).ok();
                editor
            }
            Err(e) => {
                ready_tx.send(Err(e)).ok();
                return;
            }
        };
        read_lines(editor, input_tx);
    });
    if let Ok(Err(e)) = ready_rx.await {
        return Err(ClientError::Readline(e));
    }

    let sink: Arc<dyn DisplaySink> = Arc::new(StdoutSink::new(PROMPT));
    let (link, handle) = ServerLink::new(config, sink);

    Ok(run_session(link, handle, input_rx, nickname).await)
}

/// Feed input lines to the link until either side finishes.
///
/// Lines before access is granted are name candidates, later lines are chat
/// messages; both are simply sent. When the input closes the session is
/// ended politely (logout) if active, otherwise the link is closed.
pub async fn run_session(
    link: ServerLink,
    handle: LinkHandle,
    mut input: mpsc::UnboundedReceiver<String>,
    nickname: Option<String>,
) -> TerminationReason {
    let mut link_task = tokio::spawn(link.run());

    if let Some(nickname) = nickname {
        let reached = handle
            .wait_for(|state| *state == LinkState::AwaitingNameAcceptance || state.is_terminated())
            .await;
        if reached == LinkState::AwaitingNameAcceptance {
            tracing::debug!("Submitting nickname '{}'", nickname);
            handle.send_to_server(&nickname).await;
        }
    }

    loop {
        tokio::select! {
            finished = &mut link_task => {
                return finished.unwrap_or(TerminationReason::ConnectionLost);
            }
            line = input.recv() => match line {
                Some(line) => handle.send_to_server(&line).await,
                None => break,
            },
        }
    }

    if handle.state() == LinkState::Active {
        tracing::info!("Input closed, logging out");
        handle.send_to_server(LOGOUT_COMMAND).await;
    } else {
        tracing::info!("Input closed before joining the chat");
        handle.close();
    }

    link_task
        .await
        .unwrap_or(TerminationReason::ConnectionLost)
}

fn read_lines(mut editor: DefaultEditor, input_tx: mpsc::UnboundedSender<String>) {
    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if !line.is_empty() {
                    editor.add_history_entry(line).ok();
                    if input_tx.send(line.to_string()).is_err() {
                        // Channel closed, exit thread
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                tracing::info!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                tracing::info!("EOF");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {}", err);
                break;
            }
        }
    }
}
