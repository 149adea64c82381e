// ============================================================================
// Gateway Dispatcher Routes
// ============================================================================
//
// HTTP-facing entry point. Each route selects the service client for its
// domain, names the logical operation, and forwards the (opaque) payload;
// DTO validation is owned by the downstream services. Every handler awaits
// its own reply independently; nothing here blocks other requests.
//
// Structure:
// - mod.rs: router assembly, response wrapper, payload helpers
// - health.rs: health check and metrics endpoints
// - auth.rs: auth-service routes
// - doctor.rs: doctor-service routes (doctors, appointments, reviews)
// - pharmacy.rs: pharmacy-service routes (catalog, stock, orders)
//
// ============================================================================

mod auth;
mod doctor;
mod health;
mod pharmacy;

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::client::ServiceClient;
use crate::context::AppContext;
use crate::error::GatewayResult;

/// Create the main application router with all routes
pub fn create_router(app_context: Arc<AppContext>) -> Router {
    Router::new()
        // Health and monitoring
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        // Auth service
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh-token", post(auth::refresh_token))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/verify-otp", post(auth::verify_otp))
        // Doctor service
        .route("/api/v1/doctors", get(doctor::get_all_doctors))
        .route("/api/v1/doctors/:id", get(doctor::get_doctor_by_id))
        .route("/api/v1/doctors/user/:user_id", get(doctor::get_doctor_by_user_id))
        .route(
            "/api/v1/doctors/:id/available-slots",
            get(doctor::get_doctor_available_slots),
        )
        .route(
            "/api/v1/doctors/:id/reviews",
            get(doctor::get_doctor_reviews).post(doctor::create_review),
        )
        .route("/api/v1/doctors/:id/stats", get(doctor::get_doctor_stats))
        .route("/api/v1/doctors/:id/profile", put(doctor::update_doctor_profile))
        .route("/api/v1/doctors/:id/verify", put(doctor::verify_doctor))
        // Appointments (doctor service)
        .route("/api/v1/appointments", post(doctor::create_appointment))
        .route(
            "/api/v1/appointments/doctor/:doctor_id",
            get(doctor::get_appointments_by_doctor),
        )
        .route(
            "/api/v1/appointments/patient/:patient_id",
            get(doctor::get_appointments_by_patient),
        )
        .route(
            "/api/v1/appointments/:id/status",
            put(doctor::update_appointment_status),
        )
        // Pharmacy service
        .route("/api/v1/pharmacy/pharmacies", get(pharmacy::get_pharmacies))
        .route("/api/v1/pharmacy/pharmacies/:id", get(pharmacy::get_pharmacy_by_id))
        .route("/api/v1/pharmacy/search", get(pharmacy::search_pharmacies_and_products))
        .route(
            "/api/v1/pharmacy/search/prescription",
            post(pharmacy::search_by_prescription),
        )
        .route(
            "/api/v1/pharmacy/products/non-prescription",
            get(pharmacy::get_non_prescription_products),
        )
        .route(
            "/api/v1/pharmacy/profile",
            get(pharmacy::get_pharmacy_profile).put(pharmacy::update_pharmacy_profile),
        )
        .route(
            "/api/v1/pharmacy/categories",
            get(pharmacy::get_categories).post(pharmacy::create_category),
        )
        .route("/api/v1/pharmacy/categories/:id", put(pharmacy::update_category))
        .route(
            "/api/v1/pharmacy/categories/:id/delete",
            put(pharmacy::delete_category),
        )
        .route("/api/v1/pharmacy/items", post(pharmacy::create_item))
        .route(
            "/api/v1/pharmacy/items/:id",
            get(pharmacy::get_item_details).put(pharmacy::update_item),
        )
        .route("/api/v1/pharmacy/items/:id/delete", put(pharmacy::delete_item))
        .route("/api/v1/pharmacy/medicines", post(pharmacy::create_medicine))
        .route(
            "/api/v1/pharmacy/medicines/:id",
            put(pharmacy::update_medicine).delete(pharmacy::delete_medicine),
        )
        .route(
            "/api/v1/pharmacy/stock/branch/:branch_id",
            get(pharmacy::get_stock_by_branch),
        )
        .route("/api/v1/pharmacy/stock", post(pharmacy::add_stock))
        .route("/api/v1/pharmacy/stock/:id", put(pharmacy::update_stock))
        .route("/api/v1/pharmacy/orders", post(pharmacy::create_order))
        .route(
            "/api/v1/pharmacy/orders/patient/:patient_id",
            get(pharmacy::get_patient_orders),
        )
        .route(
            "/api/v1/pharmacy/orders/current-count",
            get(pharmacy::get_current_orders_count),
        )
        .route(
            "/api/v1/pharmacy/orders/:id/status",
            put(pharmacy::update_order_status),
        )
        .route("/api/v1/pharmacy/reservations", post(pharmacy::create_reservation))
        .route(
            "/api/v1/pharmacy/reservations/:id/cancel",
            put(pharmacy::cancel_reservation),
        )
        .route(
            "/api/v1/pharmacy/prescriptions/patient/:patient_id",
            get(pharmacy::get_patient_prescriptions),
        )
        .route(
            "/api/v1/pharmacy/dashboard/stats",
            get(pharmacy::get_pharmacy_dashboard_stats),
        )
        .route(
            "/api/v1/pharmacy/dashboard/top-products",
            get(pharmacy::get_top_selling_products),
        )
        .route(
            "/api/v1/pharmacy/dashboard/recent-activity",
            get(pharmacy::get_recent_activity),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_context)
}

/// Forward one logical operation and wrap the remote payload in the
/// platform's public success envelope.
pub(crate) async fn dispatch(
    client: &ServiceClient,
    pattern: &str,
    payload: Value,
) -> GatewayResult<Json<Value>> {
    let data = client.call(pattern, payload).await?;
    Ok(Json(json!({
        "success": true,
        "data": data,
        "message": "Operation successful",
    })))
}

/// Merge a path parameter into the payload object so downstream handlers
/// see one flat data object, as the platform contract expects.
pub(crate) fn with_param(payload: Value, key: &str, value: impl Into<Value>) -> Value {
    let mut map = match payload {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => {
            let mut map = serde_json::Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    map.insert(key.to_string(), value.into());
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_param_merges_into_object() {
        let payload = with_param(json!({"status": "confirmed"}), "id", "abc");
        assert_eq!(payload, json!({"status": "confirmed", "id": "abc"}));
    }

    #[test]
    fn with_param_builds_object_from_null() {
        let payload = with_param(Value::Null, "doctorId", "d-1");
        assert_eq!(payload, json!({"doctorId": "d-1"}));
    }

    #[test]
    fn with_param_wraps_non_object_payloads() {
        let payload = with_param(json!([1, 2]), "id", 7);
        assert_eq!(payload, json!({"data": [1, 2], "id": 7}));
    }
}
