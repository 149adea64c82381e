use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

pub mod client;
pub mod config;
pub mod context;
pub mod correlation;
pub mod envelope;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod transport;

use config::Config;
use context::AppContext;
use correlation::CorrelationRouter;
use envelope::ReplyEnvelope;
use transport::{QueueTransport, RedisTransport};

/// Wire the reply-queue subscription into the correlation router.
///
/// The subscription callback runs on the broker consumer path; parse
/// failures and stale ids are logged and dropped, never propagated.
pub fn attach_reply_consumer(
    transport: &Arc<RedisTransport>,
    router: Arc<CorrelationRouter>,
    reply_queue: &str,
) {
    transport.subscribe(
        reply_queue,
        Arc::new(move |payload: Vec<u8>| match serde_json::from_slice::<ReplyEnvelope>(&payload) {
            Ok(reply) => {
                let router = Arc::clone(&router);
                tokio::spawn(async move {
                    router.resolve(reply).await;
                });
            }
            Err(e) => {
                warn!(error = %e, "Discarding malformed reply envelope");
            }
        }),
    );
}

pub async fn run() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;
    let config = Arc::new(config);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== Medigate API Gateway Starting ===");
    info!("Port: {}", config.port);
    info!(
        "Service queues: auth='{}' doctor='{}' pharmacy='{}'",
        config.auth.queue, config.doctor.queue, config.pharmacy.queue
    );

    // Connect to the broker (bounded retries, then fail startup)
    let transport = RedisTransport::connect(&config).await?;
    transport.spawn_reconnect_supervisor();

    // Every instance gets its own reply queue so horizontally scaled
    // gateways never steal each other's replies.
    let instance_id = Uuid::new_v4();
    let reply_queue = format!("{}{}", config.reply_queue_prefix, instance_id);
    info!("Reply queue: {}", reply_queue);

    let router = CorrelationRouter::new();
    attach_reply_consumer(&transport, Arc::clone(&router), &reply_queue);

    let transport: Arc<dyn QueueTransport> = transport;
    let app_context = Arc::new(AppContext::new(
        Arc::clone(&config),
        transport,
        router,
        &reply_queue,
    ));

    let app = routes::create_router(app_context);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    info!("API Gateway listening on {}", addr);

    tokio::select! {
        res = axum::serve(listener, app) => {
            res.context("HTTP server failed")?;
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received. Shutting down...");
        }
    }

    Ok(())
}
