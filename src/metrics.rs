use anyhow::Result;
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, Histogram, IntCounter, IntGauge, TextEncoder, opts, register_histogram,
    register_int_counter, register_int_gauge,
};

pub static RPC_CALLS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "medigate_rpc_calls_total",
        "Total number of RPC calls issued to downstream services"
    ))
    .unwrap()
});

pub static RPC_PUBLISH_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "medigate_rpc_publish_failures_total",
        "Calls that failed before leaving the gateway (broker down or rejected)"
    ))
    .unwrap()
});

pub static RPC_TIMEOUTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "medigate_rpc_timeouts_total",
        "Calls whose reply did not arrive within the deadline"
    ))
    .unwrap()
});

pub static RPC_REMOTE_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "medigate_rpc_remote_errors_total",
        "Replies that carried status=error from a downstream service"
    ))
    .unwrap()
});

pub static STALE_REPLIES_DROPPED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "medigate_stale_replies_dropped_total",
        "Replies dropped because their correlation id was unknown, duplicate, or expired"
    ))
    .unwrap()
});

pub static PENDING_REQUESTS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(opts!(
        "medigate_pending_requests",
        "In-flight requests currently registered with the correlation router"
    ))
    .unwrap()
});

pub static RPC_CALL_LATENCY: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "medigate_rpc_call_latency_seconds",
        "Histogram of round-trip latency for resolved RPC calls"
    )
    .unwrap()
});

pub fn gather_metrics() -> Result<String> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode(&metric_families, &mut buffer)?;

    Ok(String::from_utf8(buffer)?)
}
