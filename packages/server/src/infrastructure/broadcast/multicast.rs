//! UDP group-addressed BroadcastPublisher 実装
//!
//! ## 責務
//!
//! - 全セッションで共有する単一の UDP ソケットの保持
//! - 並行する publish の直列化（Mutex）
//! - 送信失敗のログ出力（呼び出し側には伝えない）

use std::{
    io,
    net::{Ipv4Addr, SocketAddrV4},
};

use async_trait::async_trait;
use tertulia_shared::config::MAX_BROADCAST_PAYLOAD;
use tokio::{net::UdpSocket, sync::Mutex};

use crate::domain::BroadcastPublisher;

/// Hop limit for group datagrams; the chat stays on the local network.
const MULTICAST_TTL: u32 = 1;

/// Publishes every line as one datagram to the broadcast group.
pub struct MulticastPublisher {
    socket: Mutex<UdpSocket>,
    target: SocketAddrV4,
}

impl MulticastPublisher {
    /// Bind an ephemeral sending socket for `target`.
    ///
    /// `target` is normally a multicast group; a unicast address also works
    /// and is what loopback tests use.
    pub async fn bind(target: SocketAddrV4) -> io::Result<Self> {
        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)).await?;
        if target.ip().is_multicast() {
            socket.set_multicast_ttl_v4(MULTICAST_TTL)?;
            socket.set_multicast_loop_v4(true)?;
        }
        tracing::info!("Broadcasting to {}", target);
        Ok(Self {
            socket: Mutex::new(socket),
            target,
        })
    }

    pub fn target(&self) -> SocketAddrV4 {
        self.target
    }
}

#[async_trait]
impl BroadcastPublisher for MulticastPublisher {
    async fn publish(&self, message: &str) {
        let payload = truncate_payload(message, MAX_BROADCAST_PAYLOAD);
        if payload.len() < message.len() {
            tracing::debug!(
                "Broadcast payload truncated from {} to {} bytes",
                message.len(),
                payload.len()
            );
        }

        let socket = self.socket.lock().await;
        match socket.send_to(payload.as_bytes(), self.target).await {
            Ok(_) => tracing::debug!("Broadcasted: {}", payload),
            Err(e) => tracing::warn!("Failed to broadcast message to {}: {}", self.target, e),
        }
    }
}

/// Cut `message` to at most `max_len` bytes without splitting a character.
pub fn truncate_payload(message: &str, max_len: usize) -> &str {
    if message.len() <= max_len {
        return message;
    }
    let mut end = max_len;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn loopback_receiver() -> (UdpSocket, SocketAddrV4) {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = receiver.local_addr().unwrap().port();
        (receiver, SocketAddrV4::new(Ipv4Addr::LOCALHOST, port))
    }

    async fn receive(receiver: &UdpSocket) -> String {
        let mut buffer = [0u8; 1024];
        let len = tokio::time::timeout(Duration::from_secs(2), receiver.recv(&mut buffer))
            .await
            .expect("datagram should arrive")
            .unwrap();
        String::from_utf8(buffer[..len].to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_publish_sends_one_datagram_per_message() {
        // テスト項目: publish ごとに 1 つのデータグラムが送信順に届く
        // given (前提条件):
        let (receiver, target) = loopback_receiver().await;
        let publisher = MulticastPublisher::bind(target).await.unwrap();

        // when (操作):
        publisher.publish("Ana: hola").await;
        publisher.publish(">> Bea joined the chat.").await;

        // then (期待する結果):
        assert_eq!(receive(&receiver).await, "Ana: hola");
        assert_eq!(receive(&receiver).await, ">> Bea joined the chat.");
        assert_eq!(publisher.target(), target);
    }

    #[tokio::test]
    async fn test_publish_truncates_long_payload() {
        // テスト項目: 上限を超えるメッセージは上限バイト数に切り詰めて送信される
        // given (前提条件):
        let (receiver, target) = loopback_receiver().await;
        let publisher = MulticastPublisher::bind(target).await.unwrap();
        let message = "a".repeat(MAX_BROADCAST_PAYLOAD + 40);

        // when (操作):
        publisher.publish(&message).await;

        // then (期待する結果):
        let received = receive(&receiver).await;
        assert_eq!(received.len(), MAX_BROADCAST_PAYLOAD);
    }

    #[test]
    fn test_truncate_payload_respects_char_boundaries() {
        // テスト項目: マルチバイト文字の途中では切らない
        // given (前提条件):
        let message = "ñññ"; // 6 bytes

        // when (操作):
        let truncated = truncate_payload(message, 3);

        // then (期待する結果):
        assert_eq!(truncated, "ñ");
        assert_eq!(truncate_payload(message, 6), "ñññ");
    }
}
