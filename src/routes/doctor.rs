// ============================================================================
// Doctor Routes
// ============================================================================
//
// Doctor profiles, availability, reviews, and appointments, all served by
// doctor-service. Public listing/detail routes carry query filters through
// unchanged; mutation routes merge the path id into the payload.
//
// ============================================================================

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::{dispatch, with_param};
use crate::context::AppContext;
use crate::error::GatewayError;

pub async fn get_all_doctors(
    State(ctx): State<Arc<AppContext>>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.doctor, "get_all_doctors", json!(filters)).await
}

pub async fn get_doctor_by_id(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.doctor, "get_doctor_by_id", json!({ "id": id })).await
}

pub async fn get_doctor_by_user_id(
    State(ctx): State<Arc<AppContext>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.doctor, "get_doctor_by_user_id", json!({ "userId": user_id })).await
}

pub async fn get_doctor_available_slots(
    State(ctx): State<Arc<AppContext>>,
    Path(doctor_id): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, GatewayError> {
    let payload = with_param(json!(filters), "doctorId", doctor_id);
    dispatch(&ctx.doctor, "get_doctor_available_slots", payload).await
}

pub async fn get_doctor_reviews(
    State(ctx): State<Arc<AppContext>>,
    Path(doctor_id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.doctor, "get_doctor_reviews", json!({ "doctorId": doctor_id })).await
}

pub async fn get_doctor_stats(
    State(ctx): State<Arc<AppContext>>,
    Path(doctor_id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.doctor, "get_doctor_stats", json!({ "doctorId": doctor_id })).await
}

pub async fn update_doctor_profile(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.doctor, "update_doctor_profile", with_param(body, "id", id)).await
}

pub async fn verify_doctor(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.doctor, "verify_doctor", with_param(body, "id", id)).await
}

pub async fn create_review(
    State(ctx): State<Arc<AppContext>>,
    Path(doctor_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(
        &ctx.doctor,
        "create_review",
        with_param(body, "doctorId", doctor_id),
    )
    .await
}

// ==================== APPOINTMENTS ====================

pub async fn create_appointment(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.doctor, "create_appointment", body).await
}

pub async fn get_appointments_by_doctor(
    State(ctx): State<Arc<AppContext>>,
    Path(doctor_id): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, GatewayError> {
    let payload = with_param(json!(filters), "doctorId", doctor_id);
    dispatch(&ctx.doctor, "get_appointments_by_doctor", payload).await
}

pub async fn get_appointments_by_patient(
    State(ctx): State<Arc<AppContext>>,
    Path(patient_id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(
        &ctx.doctor,
        "get_appointments_by_patient",
        json!({ "patientId": patient_id }),
    )
    .await
}

pub async fn update_appointment_status(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(
        &ctx.doctor,
        "update_appointment_status",
        with_param(body, "id", id),
    )
    .await
}
