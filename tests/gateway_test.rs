// End-to-end dispatcher tests: HTTP request in, scripted queue reply back,
// HTTP status and body out.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::MockTransport;
use http_body_util::BodyExt;
use medigate::config::Config;
use medigate::context::AppContext;
use medigate::correlation::CorrelationRouter;
use medigate::envelope::ReplyEnvelope;
use medigate::routes::create_router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;

fn gateway(transport: Arc<MockTransport>, router: Arc<CorrelationRouter>) -> axum::Router {
    let config = Arc::new(Config::for_tests());
    let context = Arc::new(AppContext::new(
        config,
        transport,
        router,
        "test:gateway:replies:instance",
    ));
    create_router(context)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn register_resolves_with_service_payload_and_201() {
    let router = CorrelationRouter::new();
    let transport = MockTransport::new(Arc::clone(&router));
    transport.respond_with(|envelope| {
        assert_eq!(envelope.pattern, "register_user");
        Some(ReplyEnvelope::success(
            envelope.correlation_id,
            json!({"userId": "u-1", "email": envelope.data["email"]}),
        ))
    });
    let app = gateway(Arc::clone(&transport), router);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"email": "a@b.com", "password": "secret"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["email"], json!("a@b.com"));

    // The envelope went to the auth queue with a reply address
    let published = transport.published.lock().unwrap();
    assert_eq!(published[0].0, "test:auth_queue");
    assert_eq!(published[0].1.reply_to, "test:gateway:replies:instance");
}

#[tokio::test]
async fn remote_error_maps_to_declared_status() {
    let router = CorrelationRouter::new();
    let transport = MockTransport::new(Arc::clone(&router));
    transport.respond_with(|envelope| {
        Some(ReplyEnvelope::error(
            envelope.correlation_id,
            404,
            "Doctor not found",
        ))
    });
    let app = gateway(transport, router);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/doctors/missing-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["status"], json!(404));
    assert_eq!(body["message"], json!("Doctor not found"));
    assert_eq!(body["error"], json!("Not Found"));
}

#[tokio::test(start_paused = true)]
async fn silent_downstream_yields_504_at_deadline() {
    let router = CorrelationRouter::new();
    let transport = MockTransport::new(Arc::clone(&router));
    // No responder scripted: the downstream never replies
    let app = gateway(transport, Arc::clone(&router));

    let started = tokio::time::Instant::now();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/doctors/d-1/available-slots?date=2025-01-10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    // Test config uses a 2s deadline; the paused clock jumps straight to it
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(router.pending_count().await, 0);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["status"], json!(504));
}

#[tokio::test]
async fn broker_down_yields_503_within_milliseconds() {
    let router = CorrelationRouter::new();
    let transport = MockTransport::new(Arc::clone(&router));
    transport.set_down(true);
    let app = gateway(transport, Arc::clone(&router));

    let started = Instant::now();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/doctors")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    // Fail-fast, not a timeout: well under the 2s deadline
    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(router.pending_count().await, 0);

    let body = body_json(response).await;
    assert_eq!(body["error"], json!("Service Unavailable"));
}

#[tokio::test]
async fn health_reports_broker_state() {
    let router = CorrelationRouter::new();
    let transport = MockTransport::new(Arc::clone(&router));
    let app = gateway(Arc::clone(&transport), Arc::clone(&router));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["broker"], json!("connected"));

    transport.set_down(true);
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn pharmacy_management_routes_dispatch_their_patterns() {
    let router = CorrelationRouter::new();
    let transport = MockTransport::new(Arc::clone(&router));
    transport.respond_with(|envelope| {
        Some(ReplyEnvelope::success(envelope.correlation_id, json!({})))
    });
    let app = gateway(Arc::clone(&transport), router);

    // (method, uri, body, expected pattern)
    let cases = [
        ("GET", "/api/v1/pharmacy/categories", None, "get_categories"),
        (
            "POST",
            "/api/v1/pharmacy/categories",
            Some(json!({"name": "Analgesics"})),
            "create_category",
        ),
        (
            "PUT",
            "/api/v1/pharmacy/categories/c-1/delete",
            None,
            "delete_category",
        ),
        ("GET", "/api/v1/pharmacy/items/i-9", None, "get_item_details"),
        (
            "PUT",
            "/api/v1/pharmacy/items/i-9",
            Some(json!({"price": 12.5})),
            "update_item",
        ),
        (
            "GET",
            "/api/v1/pharmacy/orders/current-count",
            None,
            "get_current_orders_count",
        ),
        (
            "GET",
            "/api/v1/pharmacy/dashboard/top-products",
            None,
            "get_top_selling_products",
        ),
        (
            "GET",
            "/api/v1/pharmacy/dashboard/recent-activity",
            None,
            "get_recent_activity",
        ),
        ("GET", "/api/v1/pharmacy/profile", None, "get_pharmacy_profile"),
        (
            "PUT",
            "/api/v1/pharmacy/profile",
            Some(json!({"phone": "555-0100"})),
            "update_pharmacy_profile",
        ),
    ];

    for (method, uri, body, pattern) in cases {
        let request = match body {
            Some(body) => Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{method} {uri}");

        let published = transport.published.lock().unwrap();
        let (queue, envelope) = published.last().unwrap();
        assert_eq!(queue, "test:pharmacy_queue", "{method} {uri}");
        assert_eq!(envelope.pattern, pattern, "{method} {uri}");
    }

    // Path parameters land in the payload for the downstream service
    let published = transport.published.lock().unwrap();
    let delete_category = published
        .iter()
        .find(|(_, e)| e.pattern == "delete_category")
        .unwrap();
    assert_eq!(delete_category.1.data["id"], json!("c-1"));
    let update_item = published
        .iter()
        .find(|(_, e)| e.pattern == "update_item")
        .unwrap();
    assert_eq!(update_item.1.data, json!({"price": 12.5, "id": "i-9"}));
}

#[tokio::test]
async fn query_filters_pass_through_to_the_pattern_payload() {
    let router = CorrelationRouter::new();
    let transport = MockTransport::new(Arc::clone(&router));
    transport.respond_with(|envelope| {
        Some(ReplyEnvelope::success(envelope.correlation_id, json!([])))
    });
    let app = gateway(Arc::clone(&transport), router);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/doctors?specialization=cardiology&page=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let published = transport.published.lock().unwrap();
    let envelope = &published[0].1;
    assert_eq!(envelope.pattern, "get_all_doctors");
    assert_eq!(envelope.data["specialization"], json!("cardiology"));
    assert_eq!(envelope.data["page"], json!("2"));
    assert_eq!(published[0].0, "test:doctor_queue");
}
