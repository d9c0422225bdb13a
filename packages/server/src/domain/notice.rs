//! Texts the relay sends privately or broadcasts to everyone.

use super::{entity::MAX_WARNINGS, value_object::Nickname};

/// First frame sent on every accepted connection.
pub const WELCOME: &str = "Welcome to the chat. Please enter a nickname.";

/// Private notice sent to a session expelled for repeated violations.
pub const BLOCKED: &str =
    ">> Your access to the chat has been blocked for breaking the rules 3 times.";

/// Relayed chat line, `"<name>: <message>"`.
pub fn chat_line(name: &Nickname, message: &str) -> String {
    format!("{}: {}", name, message)
}

pub fn joined(name: &Nickname) -> String {
    format!(">> {} joined the chat.", name)
}

pub fn left(name: &Nickname) -> String {
    format!(">> {} left the chat.", name)
}

pub fn expelled(name: &Nickname) -> String {
    format!(
        ">> {} has been expelled and blocked for breaking the rules.",
        name
    )
}

/// Private warning after a rejected message.
pub fn warning(warnings: u32) -> String {
    format!(
        ">> Your message contains forbidden words. Please follow the chat rules. (warning {}/{})",
        warnings, MAX_WARNINGS
    )
}
