use axum::{http::StatusCode, response::IntoResponse};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway error taxonomy.
///
/// Every failure a call can hit between the HTTP boundary and the broker is
/// one of these variants, so the dispatcher can map outcomes to HTTP status
/// codes in exactly one place.
#[derive(Error, Debug)]
pub enum GatewayError {
    // ===== Broker & Transport Errors =====
    /// Broker unreachable after the configured retry attempts
    #[error("broker connection error: {0}")]
    Connection(String),

    /// Send failed (connection down or broker rejected the write).
    /// Not retried by the core; the caller decides whether to retry.
    #[error("publish to '{queue}' failed: {reason}")]
    Publish { queue: String, reason: String },

    // ===== Call Outcome Errors =====
    /// No reply arrived within the configured deadline
    #[error("call '{pattern}' timed out after {deadline:?}")]
    Timeout { pattern: String, deadline: Duration },

    /// Downstream service replied with status=error; detail passed through verbatim
    #[error("remote error from {service} ({status}): {message}")]
    Remote {
        service: String,
        status: u16,
        message: String,
    },

    // ===== Serialization Errors =====
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ===== Configuration Errors =====
    #[error("configuration error: {0}")]
    Config(String),

    // ===== Internal Errors =====
    #[error("internal gateway error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Connection(_) | GatewayError::Publish { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Remote { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            GatewayError::Json(_) => StatusCode::BAD_REQUEST,
            GatewayError::Config(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Connection(_) => "CONNECTION_ERROR",
            GatewayError::Publish { .. } => "PUBLISH_ERROR",
            GatewayError::Timeout { .. } => "TIMEOUT_ERROR",
            GatewayError::Remote { .. } => "REMOTE_ERROR",
            GatewayError::Json(_) => "JSON_ERROR",
            GatewayError::Config(_) => "CONFIG_ERROR",
            GatewayError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get a user-friendly error message (without sensitive details)
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Connection(_) | GatewayError::Publish { .. } => {
                "Service temporarily unavailable".to_string()
            }
            GatewayError::Timeout { .. } => "Upstream service did not respond in time".to_string(),
            // Remote errors are the downstream service speaking to the caller
            GatewayError::Remote { message, .. } => message.clone(),
            GatewayError::Json(_) => "Invalid request body".to_string(),
            GatewayError::Config(msg) => format!("Configuration error: {}", msg),
            GatewayError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Human-readable error name matching the platform's public contract
    pub fn error_name(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::FORBIDDEN => "Forbidden",
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::CONFLICT => "Conflict",
            StatusCode::SERVICE_UNAVAILABLE => "Service Unavailable",
            StatusCode::GATEWAY_TIMEOUT => "Gateway Timeout",
            _ => "Internal Server Error",
        }
    }

    /// Log this error with appropriate level and context
    pub fn log(&self) {
        let status = self.status_code();
        let code = self.error_code();

        match self {
            GatewayError::Connection(_) | GatewayError::Publish { .. } => {
                tracing::error!(
                    error = %self,
                    error_code = %code,
                    status = %status.as_u16(),
                    "Broker unavailable"
                );
            }
            GatewayError::Timeout { .. } => {
                tracing::warn!(
                    error = %self,
                    error_code = %code,
                    "Call timed out"
                );
            }
            _ if status.is_server_error() => {
                tracing::error!(
                    error = %self,
                    error_code = %code,
                    status = %status.as_u16(),
                    "Server error occurred"
                );
            }
            _ => {
                tracing::debug!(
                    error = %self,
                    error_code = %code,
                    "Client error occurred"
                );
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        self.log();

        let status = self.status_code();

        // Error body matching the platform's public contract:
        // {success: false, status, message, error}
        // user_message() already scrubs internals for server-side failures.
        let message = self.user_message();

        let body = json!({
            "success": false,
            "status": status.as_u16(),
            "message": message,
            "error": self.error_name(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_maps_declared_status() {
        let err = GatewayError::Remote {
            service: "auth".to_string(),
            status: 409,
            message: "Email already registered".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_name(), "Conflict");
        assert_eq!(err.user_message(), "Email already registered");
    }

    #[test]
    fn remote_error_with_garbage_status_defaults_to_400() {
        let err = GatewayError::Remote {
            service: "doctor".to_string(),
            status: 0,
            message: "broken".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn transport_errors_map_to_503() {
        let conn = GatewayError::Connection("refused".to_string());
        let publish = GatewayError::Publish {
            queue: "auth_queue".to_string(),
            reason: "connection is down".to_string(),
        };
        assert_eq!(conn.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(publish.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn timeout_maps_to_504() {
        let err = GatewayError::Timeout {
            pattern: "get_all_doctors".to_string(),
            deadline: Duration::from_secs(10),
        };
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.error_code(), "TIMEOUT_ERROR");
    }
}
