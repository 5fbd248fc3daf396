use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use dining_ops::api;
use dining_ops::auth;
use dining_ops::db;
use dining_ops::infrastructure::AppState;
use dining_ops::models::dining_unit;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test app state
async fn setup_test_state() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    AppState::new(db)
}

// Helper to create a test dining unit
async fn create_test_unit(db: &DatabaseConnection) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let unit = dining_unit::ActiveModel {
        name: Set("Test Hall".to_string()),
        code: Set("TST".to_string()),
        is_active: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    unit.insert(db).await.expect("Failed to create unit").id
}

// Helper to create a valid auth token
fn get_test_token() -> String {
    auth::create_jwt("test_admin", "admin", None).expect("Failed to create token")
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, token: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn test_missing_records_return_not_found() {
    let state = setup_test_state().await;
    let token = get_test_token();

    let app = Router::new()
        .route("/inventory/:id", axum::routing::get(api::inventory::get_item))
        .route("/invoices/:id", axum::routing::get(api::invoices::get_invoice))
        .route("/recipes/:id", axum::routing::get(api::recipes::get_recipe))
        .route(
            "/transmittals/:id",
            axum::routing::get(api::invoices::get_transmittal),
        )
        .with_state(state);

    for uri in ["/inventory/999", "/invoices/999", "/recipes/999", "/transmittals/999"] {
        let response = app.clone().oneshot(get(uri, &token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().unwrap().ends_with("not found"));
    }
}

#[tokio::test]
async fn test_invalid_input_is_a_bad_request() {
    let state = setup_test_state().await;
    let unit = create_test_unit(state.db()).await;
    let token = get_test_token();

    let app = Router::new()
        .route("/invoices", axum::routing::post(api::invoices::submit_invoice))
        .route("/recipes", axum::routing::post(api::recipes::create_recipe))
        .route("/eom", axum::routing::post(api::eom::run_eom))
        .with_state(state);

    // Malformed date
    let response = app
        .clone()
        .oneshot(post(
            "/invoices",
            &token,
            serde_json::json!({
                "vendor": "Sysco",
                "invoice_number": "A-1",
                "invoice_date": "09/01/2026",
                "invoice_total": 10.0,
                "dining_unit_id": unit
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Recipe without ingredients
    let response = app
        .clone()
        .oneshot(post(
            "/recipes",
            &token,
            serde_json::json!({
                "name": "Toast",
                "yield_servings": 10,
                "dining_unit_id": unit,
                "items": []
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // EOM before the month was closed
    let response = app
        .oneshot(post(
            "/eom",
            &token,
            serde_json::json!({ "dining_unit_id": unit, "month": 9, "year": 2026 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inactive_unit_rejects_new_stock() {
    let state = setup_test_state().await;
    let unit = create_test_unit(state.db()).await;
    let token = get_test_token();

    let app = Router::new()
        .route("/units/:id", axum::routing::delete(api::units::deactivate_unit))
        .route("/inventory", axum::routing::post(api::inventory::create_item))
        .with_state(state);

    let req = Request::builder()
        .uri(format!("/units/{}", unit))
        .method("DELETE")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post(
            "/inventory",
            &token,
            serde_json::json!({
                "sku": "SALT",
                "name": "Kosher Salt",
                "dining_unit_id": unit
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
