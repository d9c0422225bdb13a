//! Error types for the chat client.

use std::io;

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay could not be reached
    #[error("failed to connect to {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// An established connection failed
    #[error("connection lost: {0}")]
    ConnectionLost(#[from] io::Error),

    /// The terminal input could not be set up
    #[error("readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}
