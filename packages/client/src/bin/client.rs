//! Tertulia chat client.
//!
//! Connects to the relay, negotiates a nickname and then sends every line
//! typed on stdin. Lines broadcast by the relay to the group are shown as
//! they arrive. Type `!salir` (or press Ctrl+D) to leave.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tertulia-client
//! cargo run --bin tertulia-client -- --nickname Ana
//! cargo run --bin tertulia-client -- --host 192.168.1.10 --group 231.0.0.1
//! ```

use std::net::Ipv4Addr;

use clap::Parser;
use tertulia_client::{TerminationReason, run_client};
use tertulia_shared::{
    config::{
        DEFAULT_BROADCAST_GROUP, DEFAULT_BROADCAST_PORT, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
        NetworkConfig,
    },
    logger::setup_logger,
};

#[derive(Parser, Debug)]
#[command(name = "tertulia-client")]
#[command(about = "Chat client for the Tertulia relay", long_about = None)]
struct Args {
    /// Relay host address
    #[arg(short = 'H', long, default_value = DEFAULT_SERVER_HOST)]
    host: String,

    /// Relay port
    #[arg(short = 'p', long, default_value_t = DEFAULT_SERVER_PORT)]
    port: u16,

    /// Broadcast group address
    #[arg(short = 'g', long, default_value_t = DEFAULT_BROADCAST_GROUP)]
    group: Ipv4Addr,

    /// Broadcast group port
    #[arg(short = 'G', long, default_value_t = DEFAULT_BROADCAST_PORT)]
    group_port: u16,

    /// Nickname to submit automatically once connected
    #[arg(short = 'n', long)]
    nickname: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing (stdout is the chat display)
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let args = Args::parse();
    let config = NetworkConfig {
        server_host: args.host,
        server_port: args.port,
        broadcast_group: args.group,
        broadcast_port: args.group_port,
    };

    // Run the client
    match run_client(config, args.nickname).await {
        Ok(TerminationReason::ConnectionLost) => std::process::exit(1),
        Ok(_) => {}
        Err(e) => {
            tracing::error!("Client error: {}", e);
            std::process::exit(1);
        }
    }
}
