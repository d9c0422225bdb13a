//! UseCase layer: one use case per step of a session's life.

mod error;
mod join_chat;
mod leave_chat;
mod list_active_names;
mod relay_message;

pub use error::JoinError;
pub use join_chat::JoinChatUseCase;
pub use leave_chat::LeaveChatUseCase;
pub use list_active_names::{ListActiveNamesUseCase, format_roster};
pub use relay_message::RelayMessageUseCase;
