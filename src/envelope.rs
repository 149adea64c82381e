// ============================================================================
// Wire Contract
// ============================================================================
//
// Every downstream service listens on a named queue and receives request
// envelopes; it must publish a reply envelope to the `replyTo` queue named
// in the request. The payload is opaque to the gateway; DTO validation is
// owned by the services.
//
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{GatewayError, GatewayResult};

/// Outbound request envelope, immutable once sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    /// Logical operation name, e.g. "register_user" or "get_all_doctors"
    pub pattern: String,
    /// Opaque structured payload forwarded to the service
    pub data: Value,
    /// Unique token linking this request to its eventual reply
    pub correlation_id: Uuid,
    /// Queue the service must publish its reply envelope to
    pub reply_to: String,
}

impl RequestEnvelope {
    pub fn new(pattern: &str, data: Value, correlation_id: Uuid, reply_to: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            data,
            correlation_id,
            reply_to: reply_to.to_string(),
        }
    }

    /// Sanity checks before the envelope goes on the wire.
    pub fn validate(&self) -> GatewayResult<()> {
        if self.pattern.is_empty() {
            return Err(GatewayError::Internal(
                "request envelope has an empty pattern".to_string(),
            ));
        }
        if self.reply_to.is_empty() {
            return Err(GatewayError::Internal(
                "request envelope has an empty replyTo".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reply outcome as declared by the downstream service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Success,
    Error,
}

/// Error detail a downstream service reports on failure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteErrorDetail {
    /// HTTP-style status code declared by the service
    pub status: u16,
    pub message: String,
}

/// Inbound reply envelope, produced by a downstream handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyEnvelope {
    pub correlation_id: Uuid,
    pub status: ReplyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteErrorDetail>,
}

impl ReplyEnvelope {
    pub fn success(correlation_id: Uuid, payload: Value) -> Self {
        Self {
            correlation_id,
            status: ReplyStatus::Success,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn error(correlation_id: Uuid, status: u16, message: &str) -> Self {
        Self {
            correlation_id,
            status: ReplyStatus::Error,
            payload: None,
            error: Some(RemoteErrorDetail {
                status,
                message: message.to_string(),
            }),
        }
    }

    /// Convert the reply into the caller-facing result.
    ///
    /// A malformed error reply (status=error without detail) still rejects
    /// the call; the service declared failure even if it forgot the detail.
    pub fn into_result(self, service: &str) -> GatewayResult<Value> {
        match self.status {
            ReplyStatus::Success => Ok(self.payload.unwrap_or(Value::Null)),
            ReplyStatus::Error => {
                let detail = self.error.unwrap_or(RemoteErrorDetail {
                    status: 500,
                    message: "downstream service reported an error without detail".to_string(),
                });
                Err(GatewayError::Remote {
                    service: service.to_string(),
                    status: detail.status,
                    message: detail.message,
                })
            }
        }
    }
}
