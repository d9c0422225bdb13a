//! Fixed network parameters shared by the relay and the client.

use std::net::{Ipv4Addr, SocketAddrV4};

/// Default host the relay binds to and the client connects to.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default TCP port of the relay.
pub const DEFAULT_SERVER_PORT: u16 = 2000;

/// Default broadcast group address.
pub const DEFAULT_BROADCAST_GROUP: Ipv4Addr = Ipv4Addr::new(231, 0, 0, 1);

/// Default broadcast group port.
pub const DEFAULT_BROADCAST_PORT: u16 = 10000;

/// Largest broadcast payload, in bytes, a listener accepts.
pub const MAX_BROADCAST_PAYLOAD: usize = 256;

/// Network parameters of one relay deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Relay host name or address
    pub server_host: String,
    /// Relay TCP port
    pub server_port: u16,
    /// Broadcast group address (multicast, or unicast for loopback setups)
    pub broadcast_group: Ipv4Addr,
    /// Broadcast group port
    pub broadcast_port: u16,
}

impl NetworkConfig {
    /// `host:port` of the relay, suitable for bind or connect.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Destination of every broadcast datagram.
    pub fn broadcast_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.broadcast_group, self.broadcast_port)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            broadcast_group: DEFAULT_BROADCAST_GROUP,
            broadcast_port: DEFAULT_BROADCAST_PORT,
        }
    }
}
