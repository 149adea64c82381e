// ============================================================================
// Correlation Router
// ============================================================================
//
// Maps each outstanding request to its waiting caller by correlation id.
// Registration happens on the calling path and resolution on the broker
// subscription path, concurrently, so every mutation of the pending map
// goes through one lock and entries are removed before their result is
// delivered. That sequencing is what guarantees single resolution:
// whichever path removes the entry first (reply, expiry, or publish-failure
// cleanup) owns the outcome, and everyone else finds the id unknown.
//
// Unknown, duplicate, and late replies are logged and dropped. The
// subscription path never fails on them: the broker is at-least-once and a
// redelivered reply is indistinguishable from a duplicate.
//
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, Mutex};
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::envelope::ReplyEnvelope;
use crate::metrics;

/// A request registered with the router, mutated exactly once:
/// fulfilled by a reply, or dropped by expiry/cleanup. Whichever path
/// removes the entry also cancels the expiry timer.
struct PendingRequest {
    tx: oneshot::Sender<ReplyEnvelope>,
    registered_at: Instant,
    expiry: AbortHandle,
}

/// Shared correlation state between the calling path and the subscriber path.
pub struct CorrelationRouter {
    pending: Mutex<HashMap<Uuid, PendingRequest>>,
}

impl CorrelationRouter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pending: Mutex::new(HashMap::new()),
        })
    }

    /// Register a pending request and arm its deadline.
    ///
    /// Returns the receiver the caller awaits. If the deadline fires before
    /// a reply arrives, the entry is removed and the sender dropped; the
    /// caller observes a closed channel and maps it to a timeout.
    pub async fn register(
        self: &Arc<Self>,
        correlation_id: Uuid,
        deadline: Duration,
    ) -> oneshot::Receiver<ReplyEnvelope> {
        let (tx, rx) = oneshot::channel();

        // Spawned under the lock: expire() takes the same lock, so the
        // timer cannot observe the map before this entry is inserted.
        let mut pending = self.pending.lock().await;
        let router = Arc::clone(self);
        let expiry = tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            router.expire(correlation_id).await;
        })
        .abort_handle();
        pending.insert(
            correlation_id,
            PendingRequest {
                tx,
                registered_at: Instant::now(),
                expiry,
            },
        );
        metrics::PENDING_REQUESTS.set(pending.len() as i64);

        rx
    }

    /// Deliver a reply to its waiting caller.
    ///
    /// First reply wins. Anything arriving for an id that is no longer
    /// pending (already resolved, timed out, or never ours) is dropped.
    pub async fn resolve(&self, reply: ReplyEnvelope) {
        let entry = {
            let mut pending = self.pending.lock().await;
            let entry = pending.remove(&reply.correlation_id);
            metrics::PENDING_REQUESTS.set(pending.len() as i64);
            entry
        };

        match entry {
            Some(request) => {
                request.expiry.abort();
                metrics::RPC_CALL_LATENCY.observe(request.registered_at.elapsed().as_secs_f64());
                // Caller may have gone away (e.g. HTTP connection dropped);
                // a failed send is not an error.
                if request.tx.send(reply).is_err() {
                    tracing::debug!("Caller gone before reply delivery; result discarded");
                }
            }
            None => {
                metrics::STALE_REPLIES_DROPPED_TOTAL.inc();
                tracing::warn!(
                    correlation_id = %reply.correlation_id,
                    "Dropping reply with unknown or already-resolved correlation id"
                );
            }
        }
    }

    /// Deadline expiry: remove the entry so a late reply cannot be
    /// misdelivered. Dropping the sender wakes the caller with a closed
    /// channel. No-op if the request already resolved.
    async fn expire(&self, correlation_id: Uuid) {
        let expired = {
            let mut pending = self.pending.lock().await;
            let expired = pending.remove(&correlation_id);
            metrics::PENDING_REQUESTS.set(pending.len() as i64);
            expired
        };

        if let Some(request) = expired {
            tracing::debug!(
                correlation_id = %correlation_id,
                waited_ms = request.registered_at.elapsed().as_millis() as u64,
                "Pending request expired without a reply"
            );
        }
    }

    /// Remove a registration that never made it onto the wire
    /// (publish failure on the calling path).
    pub async fn discard(&self, correlation_id: Uuid) {
        let mut pending = self.pending.lock().await;
        if let Some(request) = pending.remove(&correlation_id) {
            request.expiry.abort();
        }
        metrics::PENDING_REQUESTS.set(pending.len() as i64);
    }

    /// Number of in-flight requests (for health/diagnostics).
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}
