//! Integration tests for fq-server API endpoints
//!
//! Each test runs the full router against a fresh, seeded SQLite database in a
//! temporary directory.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use fq_common::api::SKIPPED_UPDATES_HEADER;
use fq_common::params::BoundsPolicy;
use fq_server::{build_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: fresh database plus router; keep the TempDir alive
async fn setup_app(policy: BoundsPolicy) -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let pool = fq_common::db::init_database(&dir.path().join("fabquote.db"))
        .await
        .expect("Should initialize test database");
    (build_router(AppState::new(pool, policy)), dir)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn calculate_body(width: f64, quantity: u32, services: &[&str]) -> Value {
    json!({
        "materialId": "mild-steel",
        "thicknessLabel": "16 ga (0.060\")",
        "width": width,
        "height": 4.0,
        "quantity": quantity,
        "services": services,
    })
}

fn order_body() -> Value {
    json!({
        "customer": {
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "phone": "555-0100"
        },
        "shipping": {
            "address1": "1 Analytical Way",
            "city": "London",
            "state": "LDN",
            "zip": "00001"
        },
        "items": [{
            "name": "Bracket",
            "type": "template",
            "materialId": "mild-steel",
            "materialName": "Mild Steel",
            "thickness": "16 ga (0.060\")",
            "quantity": 10,
            "width": 6.0,
            "height": 4.0,
            "services": [],
            "unitPrice": 0.01,
            "subtotal": 0.10
        }]
    })
}

async fn create_order(app: &Router) -> Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/orders", order_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    extract_json(response.into_body()).await
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "fq-server");
    assert!(body["version"].is_string());
}

// =============================================================================
// Pricing
// =============================================================================

#[tokio::test]
async fn test_calculate_with_seeded_parameters() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let response = app
        .oneshot(json_request("POST", "/api/pricing/calculate", calculate_body(6.0, 1, &[])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 1.32 * 1.10 * 1.35 = 1.96, lifted to the 5.00 floor; 15.00 setup fee
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["unitPrice"], 5.0);
    assert_eq!(body["quantity"], 1);
    assert_eq!(body["discount"], 0.0);
    assert_eq!(body["setupFee"], 15.0);
    assert_eq!(body["subtotal"], 20.0);
}

#[tokio::test]
async fn test_calculate_applies_quantity_break() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let response = app
        .oneshot(json_request("POST", "/api/pricing/calculate", calculate_body(6.0, 100, &[])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["discount"], 0.2);
    assert_eq!(body["subtotal"], 415.0);
}

#[tokio::test]
async fn test_calculate_unknown_thickness_is_404() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let mut body = calculate_body(6.0, 1, &[]);
    body["thicknessLabel"] = json!("99 ga");
    let response = app
        .oneshot(json_request("POST", "/api/pricing/calculate", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body["error"],
        "Thickness not found for the given material and label"
    );
}

#[tokio::test]
async fn test_calculate_missing_field_is_400() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/pricing/calculate",
            json!({ "materialId": "mild-steel", "width": 6.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_calculate_zero_quantity_is_400() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let response = app
        .oneshot(json_request("POST", "/api/pricing/calculate", calculate_body(6.0, 0, &[])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_calculate_overflowing_area_is_400() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let mut body = calculate_body(1e200, 1, &[]);
    body["height"] = json!(1e200);
    let response = app
        .oneshot(json_request("POST", "/api/pricing/calculate", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("out of range"));
}

// =============================================================================
// Parameters
// =============================================================================

#[tokio::test]
async fn test_get_parameters_grouped_by_category() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let response = app.oneshot(get("/api/pricing/parameters")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let general = body["general"].as_array().expect("general group");
    assert!(general.iter().any(|p| p["id"] == "base_markup_pct" && p["value"] == 35.0));
    assert_eq!(body["services"].as_array().unwrap().len(), 7);
    assert_eq!(body["quantity"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_update_parameters_reports_skipped_items() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/pricing/parameters",
            json!({ "updates": [
                { "id": "setup_fee", "value": 0.0 },
                { "id": "no_such_param", "value": 1.0 },
                { "id": "base_markup_pct", "value": 9999.0 }
            ]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[SKIPPED_UPDATES_HEADER], "2");

    let body = extract_json(response.into_body()).await;
    let general = body["general"].as_array().unwrap();
    let value_of = |id: &str| general.iter().find(|p| p["id"] == id).unwrap()["value"].clone();
    assert_eq!(value_of("setup_fee"), 0.0);
    assert_eq!(value_of("base_markup_pct"), 35.0);

    // The next quote sees the new setup fee
    let response = app
        .oneshot(json_request("POST", "/api/pricing/calculate", calculate_body(6.0, 1, &[])))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["setupFee"], 0.0);
    assert_eq!(body["subtotal"], 5.0);
}

#[tokio::test]
async fn test_lenient_policy_accepts_out_of_range() {
    let (app, _dir) = setup_app(BoundsPolicy::Lenient).await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/pricing/parameters",
            json!({ "updates": [{ "id": "minimum_part", "value": 250.0 }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[SKIPPED_UPDATES_HEADER], "0");

    let body = extract_json(response.into_body()).await;
    let minimum = body["general"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == "minimum_part")
        .unwrap()["value"]
        .clone();
    assert_eq!(minimum, 250.0);
}

#[tokio::test]
async fn test_update_parameters_malformed_body_is_400() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let response = app
        .oneshot(json_request("PUT", "/api/pricing/parameters", json!({ "updates": 5 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Materials
// =============================================================================

#[tokio::test]
async fn test_list_materials() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let response = app.oneshot(get("/api/materials")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let materials = body.as_array().unwrap();
    assert_eq!(materials.len(), 15);
    assert_eq!(materials[0]["id"], "mild-steel");
    assert_eq!(materials[0]["category"], "metals");
    let thicknesses = materials[0]["thicknesses"].as_array().unwrap();
    assert!(thicknesses
        .iter()
        .any(|t| t["label"] == "16 ga (0.060\")" && t["base_price_per_sq_in"] == 0.055));
}

// =============================================================================
// Orders and stats
// =============================================================================

#[tokio::test]
async fn test_create_order_reprices_items() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let order = create_order(&app).await;

    assert!(order["order_number"].as_str().unwrap().starts_with("CS-"));
    assert_eq!(order["status"], "pending");
    assert_eq!(order["shipping_country"], "US");
    // 5.00 * 10 * 0.90 + 15.00 setup; client-supplied prices ignored
    assert_eq!(order["subtotal"], 60.0);
    assert_eq!(order["shipping_cost"], 12.0);
    assert_eq!(order["total"], 72.0);

    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["unit_price"], 5.0);
    assert_eq!(items[0]["discount"], 0.1);
    assert_eq!(items[0]["subtotal"], 60.0);
}

#[tokio::test]
async fn test_create_order_missing_customer_is_400() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let mut body = order_body();
    body.as_object_mut().unwrap().remove("customer");
    let response = app
        .oneshot(json_request("POST", "/api/orders", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_order_unknown_material_is_404() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let mut body = order_body();
    body["items"][0]["materialId"] = json!("unobtainium");
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/orders", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Nothing persisted
    let response = app.oneshot(get("/api/orders")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_order_by_id() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let created = create_order(&app).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/orders/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = extract_json(response.into_body()).await;
    assert_eq!(fetched, created);

    let response = app.oneshot(get("/api/orders/does-not-exist")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Order not found");
}

#[tokio::test]
async fn test_order_price_survives_parameter_change() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let created = create_order(&app).await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/pricing/parameters",
            json!({ "updates": [{ "id": "minimum_part", "value": 50.0 }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get(&format!("/api/orders/{}", id)))
        .await
        .unwrap();
    let fetched = extract_json(response.into_body()).await;
    assert_eq!(fetched["total"], 72.0);
    assert_eq!(fetched["items"][0]["unit_price"], 5.0);
}

#[tokio::test]
async fn test_list_orders_with_status_filter() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let first = create_order(&app).await;
    let second = create_order(&app).await;

    let response = app.clone().oneshot(get("/api/orders")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    // Newest first
    assert_eq!(orders[0]["id"], second["id"]);
    assert_eq!(orders[1]["id"], first["id"]);

    let response = app
        .clone()
        .oneshot(get("/api/orders?status=shipped"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body.as_array().unwrap().is_empty());

    let response = app.oneshot(get("/api/orders?status=bogus")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid status. Must be one of:"));
}

#[tokio::test]
async fn test_admin_stats() {
    let (app, _dir) = setup_app(BoundsPolicy::Enforce).await;

    let response = app.clone().oneshot(get("/api/admin/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let empty = extract_json(response.into_body()).await;
    assert_eq!(empty["totalOrders"], 0);
    assert_eq!(empty["totalRevenue"], 0.0);
    assert_eq!(empty["activeMaterials"], 15);

    create_order(&app).await;
    create_order(&app).await;

    let response = app.oneshot(get("/api/admin/stats")).await.unwrap();
    let stats = extract_json(response.into_body()).await;
    assert_eq!(stats["totalOrders"], 2);
    assert_eq!(stats["ordersByStatus"]["pending"], 2);
    assert_eq!(stats["totalRevenue"], 144.0);
    assert_eq!(stats["recentOrders"].as_array().unwrap().len(), 2);
}
