//! Infrastructure layer: concrete implementations of the domain interfaces.

pub mod broadcast;
pub mod registry;

pub use broadcast::MulticastPublisher;
pub use registry::InMemoryNameRegistry;
