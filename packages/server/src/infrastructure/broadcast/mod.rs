//! BroadcastPublisher の実装
//!
//! - `multicast`: UDP グループ宛て（マルチキャスト）の実装

pub mod multicast;

pub use multicast::{MulticastPublisher, truncate_payload};
