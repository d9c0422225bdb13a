//! TCP relay front end: connection acceptor and per-connection driver.

mod error;
mod server;
mod session;
mod signal;
pub mod state;

pub use error::ServerError;
pub use server::{LiveSessions, Server};
pub use session::ClientSession;
pub use signal::shutdown_signal;
pub use state::AppState;
