// ============================================================================
// Service Client
// ============================================================================
//
// Typed facade for calling one downstream service over the queue. One
// generic client parameterized by {service, queue, timeout}, instantiated
// for auth, doctor, and pharmacy; the call path is:
//
//   register pending request -> publish envelope -> await correlated reply
//
// A publish failure removes the registration immediately so the caller
// fails within milliseconds instead of waiting out the deadline.
//
// ============================================================================

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::correlation::CorrelationRouter;
use crate::envelope::RequestEnvelope;
use crate::error::{GatewayError, GatewayResult};
use crate::metrics;
use crate::transport::QueueTransport;

pub struct ServiceClient {
    /// Downstream service name ("auth", "doctor", "pharmacy")
    service: String,
    /// Queue the service consumes from
    queue: String,
    /// This gateway instance's reply queue
    reply_queue: String,
    /// Per-call deadline
    timeout: Duration,
    transport: Arc<dyn QueueTransport>,
    router: Arc<CorrelationRouter>,
}

impl ServiceClient {
    pub fn new(
        service: &str,
        config: &ServiceConfig,
        reply_queue: &str,
        transport: Arc<dyn QueueTransport>,
        router: Arc<CorrelationRouter>,
    ) -> Self {
        Self {
            service: service.to_string(),
            queue: config.queue.clone(),
            reply_queue: reply_queue.to_string(),
            timeout: Duration::from_secs(config.call_timeout_secs),
            transport,
            router,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Issue a logical remote call and await its correlated reply.
    ///
    /// Resolution, in order of what can happen first:
    /// - the reply arrives: success payload or `Remote` error, verbatim;
    /// - the publish fails: `Publish` immediately, registration removed;
    /// - the deadline elapses: `Timeout`, entry cleaned up by the router.
    pub async fn call(&self, pattern: &str, payload: Value) -> GatewayResult<Value> {
        let correlation_id = Uuid::new_v4();
        let envelope = RequestEnvelope::new(pattern, payload, correlation_id, &self.reply_queue);
        envelope.validate()?;
        let bytes = serde_json::to_vec(&envelope)?;

        metrics::RPC_CALLS_TOTAL.inc();

        // Register before publishing: the reply could race back before the
        // publish call even returns.
        let rx = self.router.register(correlation_id, self.timeout).await;

        if let Err(e) = self.transport.publish(&self.queue, bytes).await {
            self.router.discard(correlation_id).await;
            metrics::RPC_PUBLISH_FAILURES_TOTAL.inc();
            tracing::error!(
                service = %self.service,
                pattern = %pattern,
                correlation_id = %correlation_id,
                error = %e,
                "Failed to publish request envelope"
            );
            return Err(e);
        }

        tracing::debug!(
            service = %self.service,
            pattern = %pattern,
            correlation_id = %correlation_id,
            "Request published, awaiting reply"
        );

        match rx.await {
            Ok(reply) => {
                let result = reply.into_result(&self.service);
                if result.is_err() {
                    metrics::RPC_REMOTE_ERRORS_TOTAL.inc();
                }
                result
            }
            // Sender dropped: the router expired the registration.
            Err(_) => {
                metrics::RPC_TIMEOUTS_TOTAL.inc();
                tracing::warn!(
                    service = %self.service,
                    pattern = %pattern,
                    correlation_id = %correlation_id,
                    deadline_ms = self.timeout.as_millis() as u64,
                    "No reply within deadline"
                );
                Err(GatewayError::Timeout {
                    pattern: pattern.to_string(),
                    deadline: self.timeout,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::ReplyEnvelope;
    use crate::transport::ConnectionState;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Loopback transport: parses published envelopes and feeds a canned
    /// reply straight back into the router, or fails per configuration.
    struct LoopbackTransport {
        router: Arc<CorrelationRouter>,
        mode: Mutex<LoopbackMode>,
    }

    enum LoopbackMode {
        /// Reply with success carrying the request data back
        Echo,
        /// Reply with a remote error
        RemoteError { status: u16, message: String },
        /// Accept the publish but never reply
        Silent,
        /// Reject the publish as if the broker were down
        Down,
    }

    #[async_trait]
    impl QueueTransport for LoopbackTransport {
        async fn publish(&self, queue: &str, payload: Vec<u8>) -> GatewayResult<()> {
            let envelope: RequestEnvelope = serde_json::from_slice(&payload).unwrap();
            let reply = match &*self.mode.lock().unwrap() {
                LoopbackMode::Echo => {
                    Some(ReplyEnvelope::success(envelope.correlation_id, envelope.data))
                }
                LoopbackMode::RemoteError { status, message } => Some(ReplyEnvelope::error(
                    envelope.correlation_id,
                    *status,
                    message,
                )),
                LoopbackMode::Silent => None,
                LoopbackMode::Down => {
                    return Err(GatewayError::Publish {
                        queue: queue.to_string(),
                        reason: "broker connection is disconnected".to_string(),
                    });
                }
            };

            if let Some(reply) = reply {
                let router = Arc::clone(&self.router);
                tokio::spawn(async move { router.resolve(reply).await });
            }
            Ok(())
        }

        fn state(&self) -> ConnectionState {
            match &*self.mode.lock().unwrap() {
                LoopbackMode::Down => ConnectionState::Disconnected,
                _ => ConnectionState::Connected,
            }
        }
    }

    fn client_with(mode: LoopbackMode) -> (ServiceClient, Arc<CorrelationRouter>) {
        let router = CorrelationRouter::new();
        let transport = Arc::new(LoopbackTransport {
            router: Arc::clone(&router),
            mode: Mutex::new(mode),
        });
        let client = ServiceClient::new(
            "auth",
            &ServiceConfig {
                queue: "auth_queue".to_string(),
                call_timeout_secs: 2,
            },
            "gateway:replies:test",
            transport,
            Arc::clone(&router),
        );
        (client, router)
    }

    #[tokio::test]
    async fn call_resolves_with_remote_payload() {
        let (client, _router) = client_with(LoopbackMode::Echo);
        let result = client
            .call("register_user", json!({"email": "a@b.com"}))
            .await
            .unwrap();
        assert_eq!(result, json!({"email": "a@b.com"}));
    }

    #[tokio::test]
    async fn remote_error_is_surfaced_verbatim() {
        let (client, _router) = client_with(LoopbackMode::RemoteError {
            status: 401,
            message: "Invalid credentials".to_string(),
        });
        let err = client
            .call("login_user", json!({"email": "a@b.com"}))
            .await
            .unwrap_err();
        match err {
            GatewayError::Remote {
                status, message, ..
            } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn silent_downstream_times_out_at_deadline_and_cleans_up() {
        let (client, router) = client_with(LoopbackMode::Silent);
        let started = tokio::time::Instant::now();
        let err = client.call("get_slots", json!({})).await.unwrap_err();

        assert!(matches!(err, GatewayError::Timeout { .. }));
        // No earlier than the 2s deadline (paused clock advances exactly)
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(router.pending_count().await, 0);

        // A fresh call gets a fresh correlation id and its own outcome
        let err2 = client.call("get_slots", json!({})).await.unwrap_err();
        assert!(matches!(err2, GatewayError::Timeout { .. }));
    }

    #[tokio::test]
    async fn publish_failure_fails_fast_and_removes_registration() {
        let (client, router) = client_with(LoopbackMode::Down);
        let err = client.call("get_all_doctors", json!({})).await.unwrap_err();
        assert!(matches!(err, GatewayError::Publish { .. }));
        assert_eq!(router.pending_count().await, 0);
    }
}
