//! Broadcast group listener.
//!
//! Runs independently of the server link: every datagram received on the
//! group port is decoded and handed to the display sink as one line.

use std::{
    io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    sync::Arc,
};

use socket2::{Domain, Protocol, Socket, Type};
use tertulia_shared::config::MAX_BROADCAST_PAYLOAD;
use tokio::{net::UdpSocket, sync::oneshot, task::JoinHandle};

use crate::display::DisplaySink;

/// Forwards broadcast datagrams to a [`DisplaySink`].
pub struct BroadcastListener {
    socket: UdpSocket,
    sink: Arc<dyn DisplaySink>,
}

impl BroadcastListener {
    pub fn new(socket: UdpSocket, sink: Arc<dyn DisplaySink>) -> Self {
        Self { socket, sink }
    }

    /// Open a socket for `group` (see [`join_broadcast`]) and wrap it.
    pub async fn join(group: SocketAddrV4, sink: Arc<dyn DisplaySink>) -> io::Result<Self> {
        Ok(Self::new(join_broadcast(group).await?, sink))
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Run on its own task until `shutdown` fires (or its sender is dropped).
    pub fn spawn(self, shutdown: oneshot::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let mut buffer = [0u8; MAX_BROADCAST_PAYLOAD];
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                received = self.socket.recv_from(&mut buffer) => match received {
                    Ok((len, from)) => {
                        tracing::trace!("Broadcast of {} bytes from {}", len, from);
                        let line = String::from_utf8_lossy(&buffer[..len]);
                        self.sink.append(&line);
                    }
                    Err(e) => {
                        tracing::debug!("Broadcast listener stopped: {}", e);
                        break;
                    }
                },
            }
        }
        tracing::debug!("Broadcast listener finished");
    }
}

/// Bind a UDP socket on the group port.
///
/// For a multicast group the socket listens on every interface and joins
/// the group; any other address is bound directly.
pub async fn join_broadcast(group: SocketAddrV4) -> io::Result<UdpSocket> {
    join_broadcast_on(group, Ipv4Addr::UNSPECIFIED)
}

/// Same as [`join_broadcast`], joining the group on a given local interface.
///
/// The group port is bound with address reuse so every client on the host
/// receives its own copy of each datagram.
pub fn join_broadcast_on(group: SocketAddrV4, interface: Ipv4Addr) -> io::Result<UdpSocket> {
    let ip = *group.ip();
    if ip.is_multicast() {
        let socket = reusable_socket(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, group.port()))?;
        socket.join_multicast_v4(ip, interface)?;
        tracing::debug!("Joined broadcast group {} on {}", group, interface);
        Ok(socket)
    } else {
        let socket = std::net::UdpSocket::bind(group)?;
        socket.set_nonblocking(true)?;
        tracing::debug!("Listening for broadcasts on {}", group);
        UdpSocket::from_std(socket)
    }
}

fn reusable_socket(addr: SocketAddrV4) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    #[cfg(all(unix, not(any(target_os = "solaris", target_os = "illumos"))))]
    socket.set_reuse_port(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&SocketAddr::V4(addr).into())?;
    UdpSocket::from_std(socket.into())
}
