// ============================================================================
// Auth Routes
// ============================================================================
//
// Endpoints:
// - POST /api/v1/auth/register     -> register_user (201 on success)
// - POST /api/v1/auth/login        -> login_user
// - POST /api/v1/auth/refresh-token -> refresh_token
// - POST /api/v1/auth/logout       -> logout_user
// - POST /api/v1/auth/verify-otp   -> verify_otp
//
// Payloads are opaque; credential rules and token formats are owned by
// auth-service.
//
// ============================================================================

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;
use std::sync::Arc;

use super::dispatch;
use crate::context::AppContext;
use crate::error::GatewayError;

pub async fn register(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    let response = dispatch(&ctx.auth, "register_user", body).await?;
    Ok((StatusCode::CREATED, response))
}

pub async fn login(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.auth, "login_user", body).await
}

pub async fn refresh_token(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.auth, "refresh_token", body).await
}

pub async fn logout(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.auth, "logout_user", body).await
}

pub async fn verify_otp(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.auth, "verify_otp", body).await
}
