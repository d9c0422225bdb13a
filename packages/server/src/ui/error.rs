//! Error types for the relay front end.

use std::{io, net::SocketAddrV4};

use thiserror::Error;

/// Relay setup errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// The service port could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The broadcast socket could not be opened
    #[error("failed to open broadcast socket for {target}: {source}")]
    Broadcast {
        target: SocketAddrV4,
        #[source]
        source: io::Error,
    },

    #[error("failed to read the listening address: {0}")]
    LocalAddr(#[source] io::Error),
}
