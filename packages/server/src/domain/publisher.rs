//! BroadcastPublisher trait 定義
//!
//! 全クライアントへの一斉送信（グループ宛て）のインターフェース。
//! UseCase 層はこの trait に依存し、マルチキャストなどの具体的な実装には依存しない。

use async_trait::async_trait;

/// Shared outbound channel every session publishes through.
///
/// Delivery is best-effort: implementations log send failures and never
/// report them to the caller. Concurrent publishers must never interleave
/// within one message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BroadcastPublisher: Send + Sync {
    /// Send one line to every listener.
    async fn publish(&self, message: &str);
}
