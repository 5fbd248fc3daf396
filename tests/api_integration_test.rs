use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use dining_ops::auth;
use dining_ops::db;
use dining_ops::server::build_router;
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create the full application on a fresh database
async fn setup_app() -> Router {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    build_router(db, &[])
}

fn token(username: &str, role: &str, unit_id: Option<i32>) -> String {
    auth::create_jwt(username, role, unit_id).expect("Failed to create token")
}

async fn send(app: &Router, method: &str, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder()
        .uri(uri)
        .method(method)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: &str, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, token, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_unit(app: &Router, admin: &str, name: &str, code: &str) -> i32 {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/units",
        admin,
        Some(json!({ "name": name, "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap() as i32
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app().await;
    let req = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_inventory_over_http() {
    let app = setup_app().await;
    let admin = token("root", "admin", None);
    let unit = create_unit(&app, &admin, "West Dining Hall", "WDH").await;
    let cook = token("wdh.cook", "staff", Some(unit));

    let (status, item) = send_json(
        &app,
        "POST",
        "/api/inventory",
        &cook,
        Some(json!({
            "sku": "MILK-1G",
            "name": "Whole Milk 1 gal",
            "uom": "gal",
            "qty_on_hand": 12,
            "unit_price": 3.5,
            "dining_unit_id": unit,
            "reorder_level": 6
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = item["id"].as_i64().unwrap();

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/inventory/checkout",
        &cook,
        Some(json!({ "dining_unit_id": unit, "sku": "MILK-1G", "quantity": 7 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["qty_on_hand"], 5.0);

    // Not enough on hand
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/inventory/checkout",
        &cook,
        Some(json!({ "dining_unit_id": unit, "sku": "MILK-1G", "quantity": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Insufficient stock"));

    let (status, body) = send_json(
        &app,
        "GET",
        &format!("/api/inventory/sku/MILK-1G?dining_unit_id={}", unit),
        &cook,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64().unwrap(), id);

    let (status, body) = send_json(&app, "GET", "/api/inventory/low-stock", &cook, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let (status, body) = send_json(
        &app,
        "GET",
        "/api/inventory/logs?action=checkout",
        &cook,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    // Staff may not delete
    let (status, _) = send_json(&app, "DELETE", &format!("/api/inventory/{}", id), &cook, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send_json(&app, "DELETE", &format!("/api/inventory/{}", id), &admin, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_invoice_lifecycle() {
    let app = setup_app().await;
    let admin = token("root", "admin", None);
    let west = create_unit(&app, &admin, "West Dining Hall", "WDH").await;
    let north = create_unit(&app, &admin, "North Commons", "NCM").await;
    let manager = token("wdh.manager", "manager", Some(west));
    let north_manager = token("ncm.manager", "manager", Some(north));
    let accounting = token("ap", "accounting", None);

    let payload = json!({
        "vendor": "US Foods",
        "invoice_number": "77120",
        "invoice_date": "2026-09-03",
        "invoice_total": 250.0,
        "dining_unit_id": west,
        "allocations": [
            { "dining_unit_id": west, "gl_code": "5100", "amount": 150.0 },
            { "dining_unit_id": north, "gl_code": "5100", "amount": 100.0 }
        ]
    });
    // A unit manager cannot charge another unit's budget
    let (status, _) = send_json(&app, "POST", "/api/invoices", &manager, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, invoice) = send_json(&app, "POST", "/api/invoices", &accounting, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(invoice["status"], "Submitted");
    let id = invoice["id"].as_i64().unwrap();

    let (status, _) = send_json(&app, "POST", "/api/invoices", &accounting, Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Allocations that do not add up
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/invoices",
        &manager,
        Some(json!({
            "vendor": "US Foods",
            "invoice_number": "77121",
            "invoice_date": "2026-09-04",
            "invoice_total": 250.0,
            "dining_unit_id": west,
            "allocations": [{ "dining_unit_id": west, "amount": 200.0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The allocated unit sees the invoice too
    let (status, body) = send_json(&app, "GET", "/api/invoices", &north_manager, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/invoices/{}/attachments", id),
        &manager,
        Some(json!({ "reference": "invoices/2026/77120.pdf" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attachments"][0], "invoices/2026/77120.pdf");

    let (status, _) = send_json(&app, "PUT", &format!("/api/invoices/{}/process", id), &manager, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send_json(&app, "PUT", &format!("/api/invoices/{}/process", id), &accounting, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Processed");
    assert_eq!(body["processed_by"], "ap");

    let (status, _) = send_json(&app, "PUT", &format!("/api/invoices/{}/process", id), &accounting, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send_json(&app, "DELETE", &format!("/api/invoices/{}", id), &manager, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_deposit_transmittals() {
    let app = setup_app().await;
    let admin = token("root", "admin", None);
    let unit = create_unit(&app, &admin, "Campus Catering", "CAT").await;
    let cashier = token("cat.cashier", "staff", Some(unit));
    let accounting = token("ap", "accounting", None);

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/transmittals",
        &cashier,
        Some(json!({
            "dining_unit_id": unit,
            "deposit_date": "2026-09-30",
            "currency_amount": 410.0,
            "coin_amount": 12.35,
            "check_amount": 75.0,
            "bag_number": "B-5521"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total_amount"], 497.35);
    assert!(body["reference"].as_str().unwrap().starts_with("DT-20260930-"));
    let id = body["id"].as_i64().unwrap();

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/transmittals",
        &cashier,
        Some(json!({ "dining_unit_id": unit })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_json(&app, "PUT", &format!("/api/transmittals/{}/verify", id), &accounting, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Verified");

    let (status, body) = send_json(&app, "GET", "/api/transmittals?status=Verified", &cashier, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_timesheet_review_and_summary() {
    let app = setup_app().await;
    let admin = token("root", "admin", None);
    let west = create_unit(&app, &admin, "West Dining Hall", "WDH").await;
    let north = create_unit(&app, &admin, "North Commons", "NCM").await;
    let cook = token("wdh.cook", "staff", Some(west));
    let manager = token("wdh.manager", "manager", Some(west));
    let north_manager = token("ncm.manager", "manager", Some(north));

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/timesheets/agencies",
        &manager,
        Some(json!({ "name": "Campus Staffing Partners" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, agency) = send_json(
        &app,
        "POST",
        "/api/timesheets/agencies",
        &admin,
        Some(json!({ "name": "Campus Staffing Partners" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let agency_id = agency["id"].as_i64().unwrap();

    let mut ids = Vec::new();
    for (worker, hours) in [("Jordan", 8.0), ("Sam", 6.5)] {
        let (status, entry) = send_json(
            &app,
            "POST",
            "/api/timesheets",
            &cook,
            Some(json!({
                "unit_id": west,
                "agency_id": agency_id,
                "worker_name": worker,
                "work_date": "2026-09-14",
                "hours_worked": hours,
                "hourly_rate": 18.0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(entry["status"], "Pending");
        assert_eq!(entry["agency_name"], "Campus Staffing Partners");
        ids.push(entry["id"].as_i64().unwrap());
    }

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/timesheets",
        &cook,
        Some(json!({
            "unit_id": west,
            "agency_id": agency_id,
            "worker_name": "Alex",
            "hours_worked": 25,
            "hourly_rate": 18.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let approve = Some(json!({ "decision": "approve" }));
    let (status, _) = send_json(&app, "PUT", &format!("/api/timesheets/{}/review", ids[0]), &cook, approve.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send_json(&app, "PUT", &format!("/api/timesheets/{}/review", ids[0]), &north_manager, approve.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send_json(&app, "PUT", &format!("/api/timesheets/{}/review", ids[0]), &manager, approve.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Approved");
    assert_eq!(body["reviewed_by"], "wdh.manager");

    let (status, _) = send_json(&app, "PUT", &format!("/api/timesheets/{}/review", ids[0]), &manager, approve).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/timesheets/{}/review", ids[1]),
        &manager,
        Some(json!({ "decision": "reject" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(&app, "GET", "/api/timesheets/summary", &manager, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agencies"][0]["entries"], 1);
    assert_eq!(body["agencies"][0]["hours"], 8.0);
    assert_eq!(body["total_cost"], 144.0);
}

#[tokio::test]
async fn test_csv_export() {
    let app = setup_app().await;
    let admin = token("root", "admin", None);
    let unit = create_unit(&app, &admin, "West Dining Hall", "WDH").await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/inventory",
        &admin,
        Some(json!({
            "sku": "FLOUR-50",
            "name": "All Purpose Flour 50 lb",
            "qty_on_hand": 4,
            "unit_price": 18.25,
            "dining_unit_id": unit
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let req = Request::builder()
        .uri("/api/export/inventory")
        .header(header::AUTHORIZATION, format!("Bearer {}", admin))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"inventory_"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("dining_unit_id,sku,name"));
    assert!(lines.next().unwrap().contains("FLOUR-50"));

    let (status, _) = send(&app, "GET", "/api/export/eom", &admin, None).await;
    assert_eq!(status, StatusCode::OK);
}
