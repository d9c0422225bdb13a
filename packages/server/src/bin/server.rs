//! Tertulia chat relay.
//!
//! Accepts chat clients over TCP, moderates their messages and broadcasts
//! accepted lines to the UDP group every client listens on.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tertulia-server
//! cargo run --bin tertulia-server -- --port 2001 --group 231.0.0.2
//! cargo run --bin tertulia-server -- --forbidden-word foo --forbidden-word bar
//! ```

use std::{net::Ipv4Addr, sync::Arc};

use clap::Parser;
use tertulia_server::{
    domain::ModerationPolicy,
    infrastructure::{InMemoryNameRegistry, MulticastPublisher},
    ui::{AppState, Server, ServerError},
};
use tertulia_shared::{
    config::{
        DEFAULT_BROADCAST_GROUP, DEFAULT_BROADCAST_PORT, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
        NetworkConfig,
    },
    logger::setup_logger,
};

#[derive(Parser, Debug)]
#[command(name = "tertulia-server")]
#[command(about = "Moderated chat relay with UDP group broadcast", long_about = None)]
struct Args {
    /// Host address to bind the relay to
    #[arg(short = 'H', long, default_value = DEFAULT_SERVER_HOST)]
    host: String,

    /// Port number to bind the relay to
    #[arg(short = 'p', long, default_value_t = DEFAULT_SERVER_PORT)]
    port: u16,

    /// Broadcast group address
    #[arg(short = 'g', long, default_value_t = DEFAULT_BROADCAST_GROUP)]
    group: Ipv4Addr,

    /// Broadcast group port
    #[arg(short = 'G', long, default_value_t = DEFAULT_BROADCAST_PORT)]
    group_port: u16,

    /// Forbidden word (repeatable); replaces the built-in list when given
    #[arg(short = 'f', long = "forbidden-word")]
    forbidden_words: Vec<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ServerError> {
    let config = NetworkConfig {
        server_host: args.host,
        server_port: args.port,
        broadcast_group: args.group,
        broadcast_port: args.group_port,
    };

    // Initialize dependencies in order:
    // 1. Registry
    // 2. ModerationPolicy
    // 3. BroadcastPublisher
    // 4. AppState (use cases)
    // 5. Server

    // 1. Create NameRegistry (in-memory)
    let registry = Arc::new(InMemoryNameRegistry::new());

    // 2. Create ModerationPolicy
    let policy = if args.forbidden_words.is_empty() {
        ModerationPolicy::default()
    } else {
        ModerationPolicy::new(&args.forbidden_words)
    };
    tracing::info!("Moderating {} forbidden word(s)", policy.word_count());

    // 3. Create BroadcastPublisher (UDP group)
    let target = config.broadcast_addr();
    let publisher = MulticastPublisher::bind(target)
        .await
        .map_err(|source| ServerError::Broadcast { target, source })?;

    // 4. Create AppState
    let state = Arc::new(AppState::new(
        registry,
        Arc::new(policy),
        Arc::new(publisher),
    ));

    // 5. Create and run the server
    let server = Server::bind(&config.server_addr(), state).await?;
    server.run_until_ctrl_c().await;

    tracing::info!("Server shutdown complete");
    Ok(())
}
