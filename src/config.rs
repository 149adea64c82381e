use anyhow::Result;

// ============================================================================
// Configuration Constants
// ============================================================================

// Default port values
const DEFAULT_PORT: u16 = 3000;

// Default per-call timeout (seconds)
const DEFAULT_CALL_TIMEOUT_SECS: u64 = 10;

// Default service queue names (overridable per environment)
const DEFAULT_AUTH_QUEUE: &str = "auth_queue";
const DEFAULT_DOCTOR_QUEUE: &str = "doctor_queue";
const DEFAULT_PHARMACY_QUEUE: &str = "pharmacy_queue";

// Reply queues are per gateway instance: "{prefix}{instance_id}"
const DEFAULT_REPLY_QUEUE_PREFIX: &str = "gateway:replies:";

// Broker connection retry policy
const DEFAULT_CONNECT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_BACKOFF_BASE_MS: u64 = 250;
const DEFAULT_BACKOFF_MAX_MS: u64 = 15_000;

// Broker liveness probe interval while connected
const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 10;

// ============================================================================
// Configuration Structures
// ============================================================================

/// Per-downstream-service routing configuration
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Queue the service consumes request envelopes from
    pub queue: String,
    /// Deadline for a single call to this service (seconds)
    pub call_timeout_secs: u64,
}

impl ServiceConfig {
    fn from_env(queue_var: &str, timeout_var: &str, default_queue: &str) -> Self {
        Self {
            queue: std::env::var(queue_var).unwrap_or_else(|_| default_queue.to_string()),
            call_timeout_secs: std::env::var(timeout_var)
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }
}

/// Exponential backoff parameters for broker reconnection
#[derive(Clone, Debug)]
pub struct BackoffConfig {
    /// First retry delay (milliseconds); doubles per attempt
    pub base_ms: u64,
    /// Upper bound on the retry delay (milliseconds)
    pub max_ms: u64,
}

impl BackoffConfig {
    /// Delay before the given retry attempt (0-based), capped at `max_ms`.
    pub fn delay_for_attempt(&self, attempt: u32) -> std::time::Duration {
        let exp = self.base_ms.saturating_mul(1u64 << attempt.min(16));
        std::time::Duration::from_millis(exp.min(self.max_ms))
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Broker URL (redis:// or rediss:// for TLS)
    pub broker_url: String,
    /// HTTP listen port
    pub port: u16,
    /// Prefix for this instance's reply queue
    pub reply_queue_prefix: String,
    /// Initial connection attempts before giving up
    pub connect_max_attempts: u32,
    /// Liveness probe interval while connected (seconds)
    pub heartbeat_interval_secs: u64,
    pub backoff: BackoffConfig,
    pub auth: ServiceConfig,
    pub doctor: ServiceConfig,
    pub pharmacy: ServiceConfig,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            broker_url: std::env::var("BROKER_URL")
                .or_else(|_| std::env::var("REDIS_URL"))
                .map_err(|_| anyhow::anyhow!("BROKER_URL (or REDIS_URL) must be set"))?,
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            reply_queue_prefix: std::env::var("REPLY_QUEUE_PREFIX")
                .unwrap_or_else(|_| DEFAULT_REPLY_QUEUE_PREFIX.to_string()),
            connect_max_attempts: std::env::var("BROKER_CONNECT_MAX_ATTEMPTS")
                .ok()
                .and_then(|a| a.parse().ok())
                .unwrap_or(DEFAULT_CONNECT_MAX_ATTEMPTS),
            heartbeat_interval_secs: std::env::var("BROKER_HEARTBEAT_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_HEARTBEAT_INTERVAL_SECS),
            backoff: BackoffConfig {
                base_ms: std::env::var("BROKER_BACKOFF_BASE_MS")
                    .ok()
                    .and_then(|m| m.parse().ok())
                    .unwrap_or(DEFAULT_BACKOFF_BASE_MS),
                max_ms: std::env::var("BROKER_BACKOFF_MAX_MS")
                    .ok()
                    .and_then(|m| m.parse().ok())
                    .unwrap_or(DEFAULT_BACKOFF_MAX_MS),
            },
            auth: ServiceConfig::from_env("AUTH_QUEUE", "AUTH_CALL_TIMEOUT_SECS", DEFAULT_AUTH_QUEUE),
            doctor: ServiceConfig::from_env(
                "DOCTOR_QUEUE",
                "DOCTOR_CALL_TIMEOUT_SECS",
                DEFAULT_DOCTOR_QUEUE,
            ),
            pharmacy: ServiceConfig::from_env(
                "PHARMACY_QUEUE",
                "PHARMACY_CALL_TIMEOUT_SECS",
                DEFAULT_PHARMACY_QUEUE,
            ),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Test configuration pointing at a local broker.
    pub fn for_tests() -> Self {
        Config {
            broker_url: "redis://127.0.0.1:6379".to_string(),
            port: 0,
            reply_queue_prefix: "test:gateway:replies:".to_string(),
            connect_max_attempts: 1,
            heartbeat_interval_secs: 1,
            backoff: BackoffConfig {
                base_ms: 10,
                max_ms: 100,
            },
            auth: ServiceConfig {
                queue: "test:auth_queue".to_string(),
                call_timeout_secs: 2,
            },
            doctor: ServiceConfig {
                queue: "test:doctor_queue".to_string(),
                call_timeout_secs: 2,
            },
            pharmacy: ServiceConfig {
                queue: "test:pharmacy_queue".to_string(),
                call_timeout_secs: 2,
            },
            rust_log: "info".to_string(),
        }
    }
}
