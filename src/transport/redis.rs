use async_trait::async_trait;
use redis::AsyncCommands;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{ConnectionState, MessageHandler, QueueTransport};
use crate::config::{BackoffConfig, Config};
use crate::error::{GatewayError, GatewayResult};

// BRPOP block window. Short enough that shutdown and reconnect checks are
// responsive, long enough to avoid hammering the broker.
const POLL_BLOCK_SECS: f64 = 1.0;

/// Redis-backed broker session.
///
/// Service queues are Redis lists: the gateway LPUSHes request envelopes and
/// each consumer BRPOPs, which preserves FIFO order per queue. Replies come
/// back the same way on this instance's reply queue.
pub struct RedisTransport {
    client: redis::Client,
    conn: redis::aio::ConnectionManager,
    state: Arc<AtomicU8>,
    backoff: BackoffConfig,
    heartbeat_interval: Duration,
}

impl RedisTransport {
    /// Connect to the broker, retrying with exponential backoff up to the
    /// configured number of attempts.
    pub async fn connect(config: &Config) -> GatewayResult<Arc<Self>> {
        let is_tls = config.broker_url.starts_with("rediss://");
        if is_tls {
            info!("Broker TLS enabled (rediss://)");
        } else {
            info!("Broker TLS not enabled (redis://)");
        }

        let client = redis::Client::open(config.broker_url.clone())
            .map_err(|e| GatewayError::Config(format!("invalid broker URL: {}", e)))?;

        let state = Arc::new(AtomicU8::new(ConnectionState::Connecting.as_u8()));

        let mut last_err = String::new();
        for attempt in 0..config.connect_max_attempts {
            match client.get_connection_manager().await {
                Ok(conn) => {
                    state.store(ConnectionState::Connected.as_u8(), Ordering::SeqCst);
                    info!(attempt = attempt + 1, "Connected to broker");
                    return Ok(Arc::new(Self {
                        client,
                        conn,
                        state,
                        backoff: config.backoff.clone(),
                        heartbeat_interval: Duration::from_secs(config.heartbeat_interval_secs),
                    }));
                }
                Err(e) => {
                    last_err = e.to_string();
                    let delay = config.backoff.delay_for_attempt(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = config.connect_max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Broker connection attempt failed"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        state.store(ConnectionState::Disconnected.as_u8(), Ordering::SeqCst);
        Err(GatewayError::Connection(format!(
            "broker unreachable after {} attempts: {}",
            config.connect_max_attempts, last_err
        )))
    }

    /// Register a consumer loop for a queue. Each message is handed to the
    /// callback exactly once in queue order. The loop reconnects on failure
    /// with exponential backoff and never returns.
    pub fn subscribe(self: &Arc<Self>, queue: &str, handler: MessageHandler) {
        let transport = Arc::clone(self);
        let queue = queue.to_string();

        tokio::spawn(async move {
            let mut attempt: u32 = 0;
            loop {
                let mut conn = match transport.client.get_multiplexed_async_connection().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        transport.mark(ConnectionState::Reconnecting);
                        let delay = transport.backoff.delay_for_attempt(attempt);
                        attempt = attempt.saturating_add(1);
                        warn!(
                            queue = %queue,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Subscriber connection failed; retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                };

                attempt = 0;
                transport.mark(ConnectionState::Connected);
                debug!(queue = %queue, "Subscriber loop started");

                loop {
                    let popped: Result<Option<(String, Vec<u8>)>, redis::RedisError> =
                        conn.brpop(&queue, POLL_BLOCK_SECS).await;

                    match popped {
                        Ok(Some((_key, payload))) => handler(payload),
                        Ok(None) => {
                            // Block window elapsed with no message
                        }
                        Err(e) => {
                            transport.mark(ConnectionState::Reconnecting);
                            error!(queue = %queue, error = %e, "Subscriber poll failed; reconnecting");
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Background liveness loop: pings the broker while connected and, when
    /// the session drops, probes with exponential backoff until it recovers.
    /// Publish fail-fast is driven by the state flag this loop maintains.
    pub fn spawn_reconnect_supervisor(self: &Arc<Self>) {
        let transport = Arc::clone(self);

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(transport.heartbeat_interval).await;

                if transport.ping().await.is_ok() {
                    transport.mark(ConnectionState::Connected);
                    continue;
                }

                transport.mark(ConnectionState::Reconnecting);
                warn!("Broker heartbeat failed; entering reconnect loop");

                let mut attempt: u32 = 0;
                loop {
                    let delay = transport.backoff.delay_for_attempt(attempt);
                    attempt = attempt.saturating_add(1);
                    tokio::time::sleep(delay).await;

                    match transport.ping().await {
                        Ok(()) => {
                            transport.mark(ConnectionState::Connected);
                            info!(attempts = attempt, "Broker connection recovered");
                            break;
                        }
                        Err(e) => {
                            debug!(attempt = attempt, error = %e, "Broker still unreachable");
                        }
                    }
                }
            }
        });
    }

    async fn ping(&self) -> Result<(), redis::RedisError> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn mark(&self, state: ConnectionState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }
}

#[async_trait]
impl QueueTransport for RedisTransport {
    async fn publish(&self, queue: &str, payload: Vec<u8>) -> GatewayResult<()> {
        // Fail fast instead of buffering: a queued-but-never-sent request
        // would time out anyway and hide the real failure from the caller.
        if self.state() != ConnectionState::Connected {
            return Err(GatewayError::Publish {
                queue: queue.to_string(),
                reason: format!("broker connection is {}", self.state()),
            });
        }

        let mut conn = self.conn.clone();
        match conn.lpush::<_, _, ()>(queue, payload).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.mark(ConnectionState::Reconnecting);
                Err(GatewayError::Publish {
                    queue: queue.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }
}
