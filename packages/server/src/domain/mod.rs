//! Domain layer: entities, value objects and the interfaces the use cases
//! depend on.

pub mod entity;
pub mod error;
pub mod moderation;
pub mod notice;
pub mod publisher;
pub mod repository;
pub mod value_object;

pub use entity::{CloseReport, MAX_WARNINGS, MessageAction, Session, SessionState};
pub use error::{NicknameError, SessionError};
pub use moderation::{DEFAULT_FORBIDDEN_WORDS, ModerationPolicy, Verdict};
pub use publisher::BroadcastPublisher;
pub use repository::{ActiveName, NameRegistry};
pub use value_object::{Nickname, SessionId};

#[cfg(test)]
pub use publisher::MockBroadcastPublisher;
