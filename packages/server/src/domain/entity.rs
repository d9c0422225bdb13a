//! Session entity and its protocol state machine.
//!
//! ```text
//! HandshakeWait --accept_name--> Active --logout / expel--> Terminating --close--> Closed
//!       |                                                        ^
//!       +------------------- begin_termination (I/O failure) ----+
//! ```
//!
//! The entity only decides; the connection driver in `ui::session` performs
//! the reads and writes and the use cases touch the shared registry and
//! broadcast channel.

use tertulia_shared::protocol::LOGOUT_COMMAND;

use super::{
    error::SessionError,
    moderation::{ModerationPolicy, Verdict},
    notice,
    value_object::{Nickname, SessionId},
};

/// Rejected messages tolerated before a session is blocked.
pub const MAX_WARNINGS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    HandshakeWait,
    Active,
    Terminating,
    Closed,
}

/// What the driver must do after one chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageAction {
    /// Logout requested: answer with the termination sentinel
    Logout,
    /// Broadcast this line
    Relay(String),
    /// Privately warn the sender
    Warn { warnings: u32 },
    /// Privately warn the sender, then block and expel it
    Expel { warnings: u32 },
}

/// Cleanup owed by a session that just closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReport {
    pub session_id: SessionId,
    /// Free the registry slot (false for blocked sessions)
    pub release_name: bool,
    /// Name to announce as leaving, if the handshake completed
    pub leave_notice: Option<Nickname>,
}

/// Server-side state of one client connection.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    name: Option<Nickname>,
    warning_count: u32,
    blocked: bool,
    state: SessionState,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            name: None,
            warning_count: 0,
            blocked: false,
            state: SessionState::HandshakeWait,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn name(&self) -> Option<&Nickname> {
        self.name.as_ref()
    }

    pub fn warning_count(&self) -> u32 {
        self.warning_count
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Record the name the registry granted. Allowed once, during the handshake.
    pub fn accept_name(&mut self, name: Nickname) -> Result<(), SessionError> {
        if self.state != SessionState::HandshakeWait {
            return Err(SessionError::InvalidTransition {
                state: self.state,
                operation: "accept a name",
            });
        }
        self.name = Some(name);
        self.state = SessionState::Active;
        Ok(())
    }

    /// Decide what one incoming message means.
    ///
    /// Returns `None` when the session is no longer active, so nothing read
    /// after a logout or an expulsion is ever processed.
    pub fn handle_message(
        &mut self,
        message: &str,
        policy: &ModerationPolicy,
    ) -> Option<MessageAction> {
        if self.state != SessionState::Active {
            return None;
        }
        let name = self.name.as_ref()?;

        if message == LOGOUT_COMMAND {
            self.state = SessionState::Terminating;
            return Some(MessageAction::Logout);
        }

        let action = match policy.evaluate(message) {
            Verdict::Allowed => MessageAction::Relay(notice::chat_line(name, message)),
            Verdict::Rejected => {
                self.warning_count += 1;
                MessageAction::Warn {
                    warnings: self.warning_count,
                }
            }
        };

        if self.warning_count >= MAX_WARNINGS {
            self.blocked = true;
            self.state = SessionState::Terminating;
            return Some(MessageAction::Expel {
                warnings: self.warning_count,
            });
        }

        Some(action)
    }

    /// Move to `Terminating` from any live state, e.g. after an I/O failure.
    pub fn begin_termination(&mut self) {
        if self.state != SessionState::Closed {
            self.state = SessionState::Terminating;
        }
    }

    /// Close the session. Only the first call yields a report.
    pub fn close(&mut self) -> Option<CloseReport> {
        if self.state == SessionState::Closed {
            return None;
        }
        self.state = SessionState::Closed;
        Some(CloseReport {
            session_id: self.id,
            release_name: !self.blocked,
            leave_notice: self.name.clone(),
        })
    }
}
