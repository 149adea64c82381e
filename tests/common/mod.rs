// Shared test harness: an in-process broker stand-in that captures
// published request envelopes and lets each test script the replies.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use medigate::correlation::CorrelationRouter;
use medigate::envelope::{ReplyEnvelope, RequestEnvelope};
use medigate::error::{GatewayError, GatewayResult};
use medigate::transport::{ConnectionState, QueueTransport};

type Responder = dyn Fn(&RequestEnvelope) -> Option<ReplyEnvelope> + Send + Sync;

pub struct MockTransport {
    router: Arc<CorrelationRouter>,
    /// Every envelope that made it "onto the wire", in publish order
    pub published: Mutex<Vec<(String, RequestEnvelope)>>,
    /// Scripted reply per request; None = downstream stays silent
    responder: Mutex<Option<Box<Responder>>>,
    down: AtomicBool,
}

impl MockTransport {
    pub fn new(router: Arc<CorrelationRouter>) -> Arc<Self> {
        Arc::new(Self {
            router,
            published: Mutex::new(Vec::new()),
            responder: Mutex::new(None),
            down: AtomicBool::new(false),
        })
    }

    /// Script the downstream behavior for subsequent publishes.
    pub fn respond_with(
        &self,
        responder: impl Fn(&RequestEnvelope) -> Option<ReplyEnvelope> + Send + Sync + 'static,
    ) {
        *self.responder.lock().unwrap() = Some(Box::new(responder));
    }

    /// Simulate the broker connection dropping.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn published_count(&self) -> usize {
        self.published.lock().unwrap().len()
    }

    /// Deliver a reply as if it arrived on the reply queue.
    pub async fn deliver(&self, reply: ReplyEnvelope) {
        self.router.resolve(reply).await;
    }
}

#[async_trait]
impl QueueTransport for MockTransport {
    async fn publish(&self, queue: &str, payload: Vec<u8>) -> GatewayResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(GatewayError::Publish {
                queue: queue.to_string(),
                reason: "broker connection is disconnected".to_string(),
            });
        }

        let envelope: RequestEnvelope =
            serde_json::from_slice(&payload).expect("published payload must be a request envelope");

        let reply = self
            .responder
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|responder| responder(&envelope));

        self.published
            .lock()
            .unwrap()
            .push((queue.to_string(), envelope));

        if let Some(reply) = reply {
            let router = Arc::clone(&self.router);
            tokio::spawn(async move {
                router.resolve(reply).await;
            });
        }

        Ok(())
    }

    fn state(&self) -> ConnectionState {
        if self.down.load(Ordering::SeqCst) {
            ConnectionState::Disconnected
        } else {
            ConnectionState::Connected
        }
    }
}
