use std::sync::Arc;

use crate::client::ServiceClient;
use crate::config::Config;
use crate::correlation::CorrelationRouter;
use crate::transport::QueueTransport;

/// Application context containing shared dependencies
/// This reduces parameter passing and makes it easier to add new dependencies
pub struct AppContext {
    pub config: Arc<Config>,
    pub transport: Arc<dyn QueueTransport>,
    pub router: Arc<CorrelationRouter>,
    pub auth: ServiceClient,
    pub doctor: ServiceClient,
    pub pharmacy: ServiceClient,
}

impl AppContext {
    /// Wires the three service clients over one transport and one router.
    pub fn new(
        config: Arc<Config>,
        transport: Arc<dyn QueueTransport>,
        router: Arc<CorrelationRouter>,
        reply_queue: &str,
    ) -> Self {
        let auth = ServiceClient::new(
            "auth",
            &config.auth,
            reply_queue,
            Arc::clone(&transport),
            Arc::clone(&router),
        );
        let doctor = ServiceClient::new(
            "doctor",
            &config.doctor,
            reply_queue,
            Arc::clone(&transport),
            Arc::clone(&router),
        );
        let pharmacy = ServiceClient::new(
            "pharmacy",
            &config.pharmacy,
            reply_queue,
            Arc::clone(&transport),
            Arc::clone(&router),
        );

        Self {
            config,
            transport,
            router,
            auth,
            doctor,
            pharmacy,
        }
    }
}
