//! Tertulia chat client.
//!
//! A [`ServerLink`] carries the private exchange with the relay (name
//! handshake, warnings, termination) while a [`BroadcastListener`] shows
//! everything the relay broadcasts to the group.

pub mod display;
pub mod error;
pub mod link;
pub mod listener;
pub mod notice;
pub mod runner;

pub use display::{DisplaySink, StdoutSink};
pub use error::ClientError;
pub use link::{LinkHandle, LinkState, ServerLink, TerminationReason};
pub use listener::BroadcastListener;
pub use runner::{run_client, run_session};
