//! UseCase error types.

use thiserror::Error;

use crate::domain::{NicknameError, SessionError};

/// Why a name candidate was not granted.
///
/// Every variant is answered with the same "rejected" signal; the client
/// simply submits another candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("invalid nickname: {0}")]
    InvalidNickname(#[from] NicknameError),

    #[error("nickname '{0}' is already in use")]
    NameUnavailable(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}
