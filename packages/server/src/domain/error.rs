//! Domain error types.

use thiserror::Error;

use super::entity::SessionState;

/// Validation errors for [`super::Nickname`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NicknameError {
    /// The candidate is empty or whitespace only
    #[error("nickname cannot be empty")]
    Empty,
}

/// Operations attempted in a state that does not allow them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {operation} while the session is {state:?}")]
    InvalidTransition {
        state: SessionState,
        operation: &'static str,
    },
}
