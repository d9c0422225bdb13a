//! Texts the client shows on its own (everything else comes from the relay).

pub const NAME_UNAVAILABLE: &str = "That nickname is not available. Please choose another one.";

pub const ACCESS_GRANTED: &str = "Access granted. Type your messages (!salir to leave).";

pub const SEPARATOR: &str = "------------------------------------------------------------";

pub const CONNECTION_ENDED: &str = "The connection with the server has ended.";

pub const CONNECTION_LOST: &str = "The connection with the server was lost.";

pub const NOT_CONNECTED: &str = "Not connected to the server.";

pub const BROADCAST_UNAVAILABLE: &str =
    "Could not join the broadcast group; messages from other users will not be shown.";

pub fn send_failed(reason: &impl std::fmt::Display) -> String {
    format!("Could not send the message: {}", reason)
}
