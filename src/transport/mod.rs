// ============================================================================
// Queue Transport Binding
// ============================================================================
//
// Session to the message broker: fire-and-forget publish, per-queue FIFO
// subscribe, and a reconnect supervisor. Publishing while the connection is
// down fails immediately; nothing is buffered, so a dead broker surfaces as
// an error within milliseconds instead of silent staleness.
//
// ============================================================================

mod redis;

pub use self::redis::RedisTransport;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::GatewayResult;

/// Lifecycle of the broker session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl ConnectionState {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Connected => 2,
            ConnectionState::Reconnecting => 3,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Reconnecting,
            _ => ConnectionState::Disconnected,
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
        };
        f.write_str(name)
    }
}

/// Callback invoked once per incoming message on a subscribed queue.
pub type MessageHandler = Arc<dyn Fn(Vec<u8>) + Send + Sync>;

/// Broker session seam. The service clients publish through this trait so
/// tests can swap the broker for an in-process loopback.
#[async_trait]
pub trait QueueTransport: Send + Sync {
    /// Fire-and-forget send. Fails fast while the connection is down;
    /// the caller decides whether to retry.
    async fn publish(&self, queue: &str, payload: Vec<u8>) -> GatewayResult<()>;

    /// Current session state.
    fn state(&self) -> ConnectionState;
}
