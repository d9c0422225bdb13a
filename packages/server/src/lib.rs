//! Tertulia chat relay.
//!
//! Accepts TCP connections, negotiates a unique nickname per connection,
//! moderates every message against a forbidden-word list and fans accepted
//! lines out to all clients over a UDP broadcast group.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
