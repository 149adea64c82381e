// ============================================================================
// Pharmacy Routes
// ============================================================================
//
// Pharmacy catalog, stock, orders, reservations, and prescriptions, served
// by pharmacy-service.
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

pub async fn get_pharmacies(
    State(ctx): State<Arc<AppContext>>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "get_pharmacies", json!(filters)).await
}

pub async fn get_pharmacy_by_id(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "get_pharmacy_by_id", json!({ "id": id })).await
}

pub async fn search_pharmacies_and_products(
    State(ctx): State<Arc<AppContext>>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "search_pharmacies_and_products", json!(filters)).await
}

pub async fn search_by_prescription(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "search_by_prescription", body).await
}

pub async fn get_non_prescription_products(
    State(ctx): State<Arc<AppContext>>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "get_non_prescription_products", json!(filters)).await
}

// ==================== PROFILE ====================

pub async fn get_pharmacy_profile(
    State(ctx): State<Arc<AppContext>>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "get_pharmacy_profile", json!(filters)).await
}

pub async fn update_pharmacy_profile(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "update_pharmacy_profile", body).await
}

// ==================== CATALOG ====================

pub async fn get_categories(
    State(ctx): State<Arc<AppContext>>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "get_categories", json!(filters)).await
}

pub async fn create_category(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "create_category", body).await
}

pub async fn update_category(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "update_category", with_param(body, "id", id)).await
}

pub async fn delete_category(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "delete_category", json!({ "id": id })).await
}

pub async fn create_item(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "create_item", body).await
}

pub async fn update_item(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "update_item", with_param(body, "id", id)).await
}

pub async fn get_item_details(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "get_item_details", json!({ "id": id })).await
}

pub async fn delete_item(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "delete_item", json!({ "id": id })).await
}

pub async fn create_medicine(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "create_medicine", body).await
}

pub async fn update_medicine(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "update_medicine", with_param(body, "id", id)).await
}

pub async fn delete_medicine(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "delete_medicine", json!({ "id": id })).await
}

// ==================== STOCK ====================

pub async fn get_stock_by_branch(
    State(ctx): State<Arc<AppContext>>,
    Path(branch_id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "get_stock_by_branch", json!({ "branchId": branch_id })).await
}

pub async fn add_stock(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "add_stock", body).await
}

pub async fn update_stock(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "update_stock", with_param(body, "id", id)).await
}

// ==================== ORDERS & RESERVATIONS ====================

pub async fn create_order(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "create_order", body).await
}

pub async fn get_patient_orders(
    State(ctx): State<Arc<AppContext>>,
    Path(patient_id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "get_patient_orders", json!({ "patientId": patient_id })).await
}

pub async fn get_current_orders_count(
    State(ctx): State<Arc<AppContext>>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "get_current_orders_count", json!(filters)).await
}

pub async fn update_order_status(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "update_order_status", with_param(body, "id", id)).await
}

pub async fn create_reservation(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "create_reservation", body).await
}

pub async fn cancel_reservation(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "cancel_reservation", json!({ "id": id })).await
}

// ==================== PRESCRIPTIONS & DASHBOARD ====================

pub async fn get_patient_prescriptions(
    State(ctx): State<Arc<AppContext>>,
    Path(patient_id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(
        &ctx.pharmacy,
        "get_patient_prescriptions",
        json!({ "patientId": patient_id }),
    )
    .await
}

pub async fn get_pharmacy_dashboard_stats(
    State(ctx): State<Arc<AppContext>>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "get_pharmacy_dashboard_stats", json!(filters)).await
}

pub async fn get_top_selling_products(
    State(ctx): State<Arc<AppContext>>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "get_top_selling_products", json!(filters)).await
}

pub async fn get_recent_activity(
    State(ctx): State<Arc<AppContext>>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, GatewayError> {
    dispatch(&ctx.pharmacy, "get_recent_activity", json!(filters)).await
}
