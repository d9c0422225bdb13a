//! Shared building blocks for the Tertulia relay and client.
//!
//! - [`protocol`]: framed strings and boolean signals exchanged over TCP.
//! - [`config`]: fixed network parameters and their defaults.
//! - [`logger`]: tracing subscriber setup used by both binaries.
//! - [`time`]: clock abstraction for testable timestamps.

pub mod config;
pub mod logger;
pub mod protocol;
pub mod time;
