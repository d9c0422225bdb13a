//! NameRegistry の実装
//!
//! - `inmemory`: HashMap をインメモリストアとして使う実装

pub mod inmemory;

pub use inmemory::InMemoryNameRegistry;
