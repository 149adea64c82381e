use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::context::AppContext;
use crate::metrics::gather_metrics;
use crate::transport::ConnectionState;

/// GET /health
///
/// Reports broker connectivity and in-flight request count. Deploy probes
/// treat anything but Connected as not ready.
pub async fn health_check(State(ctx): State<Arc<AppContext>>) -> impl IntoResponse {
    let state = ctx.transport.state();
    let pending = ctx.router.pending_count().await;

    let status = if state == ConnectionState::Connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if status == StatusCode::OK { "ok" } else { "unavailable" },
            "broker": state.to_string(),
            "pendingRequests": pending,
        })),
    )
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics() -> impl IntoResponse {
    match gather_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to gather metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
