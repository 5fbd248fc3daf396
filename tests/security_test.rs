use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use dining_ops::auth::{create_jwt, decode_jwt, hash_password, verify_password};
use dining_ops::db;
use dining_ops::models::{dining_unit, user};
use dining_ops::server::build_router;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_unit(db: &DatabaseConnection, name: &str, code: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    dining_unit::ActiveModel {
        name: Set(name.to_string()),
        code: Set(code.to_string()),
        is_active: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create unit")
    .id
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_password_hashing() {
    let password = "super_secret_password";
    let hash = hash_password(password).expect("Failed to hash password");

    assert_ne!(password, hash);
    assert!(verify_password(password, &hash).unwrap());
    assert!(!verify_password("wrong_password", &hash).unwrap());
}

#[tokio::test]
async fn test_jwt_carries_role_and_unit() {
    let token = create_jwt("wdh.cook", "staff", Some(3)).expect("Failed to create JWT");
    assert!(!token.is_empty());

    let claims = decode_jwt(&token).expect("Failed to verify JWT");
    assert_eq!(claims.sub, "wdh.cook");
    assert_eq!(claims.role, "staff");
    assert_eq!(claims.unit_id, Some(3));

    assert!(decode_jwt("not-a-token").is_err());
}

#[tokio::test]
async fn test_login_flow() {
    let db = setup_test_db().await;
    let unit_id = create_unit(&db, "West Dining Hall", "WDH").await;

    let hash = hash_password("manager_password").unwrap();
    let now = chrono::Utc::now().to_rfc3339();
    user::Entity::insert(user::ActiveModel {
        username: Set("wdh.manager".to_string()),
        password_hash: Set(hash),
        role: Set("manager".to_string()),
        dining_unit_id: Set(Some(unit_id)),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    })
    .exec(&db)
    .await
    .expect("Failed to insert user");

    let app = build_router(db, &[]);

    let login = |password: &str| {
        Request::builder()
            .uri("/api/auth/login")
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "username": "wdh.manager", "password": password })
                    .to_string(),
            ))
            .unwrap()
    };

    let response = app.clone().oneshot(login("manager_password")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["role"], "manager");
    assert_eq!(body["dining_unit_id"], unit_id);

    let token = body["token"].as_str().unwrap().to_string();
    let claims = decode_jwt(&token).unwrap();
    assert_eq!(claims.unit_id, Some(unit_id));

    let me = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(me).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], "wdh.manager");

    let response = app.oneshot(login("wrong")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_need_a_token() {
    let app = build_router(setup_test_db().await, &[]);

    let req = Request::builder()
        .uri("/api/inventory")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/api/inventory")
        .header(header::AUTHORIZATION, "Bearer garbage")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Health stays public
    let req = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_staff_cannot_read_another_unit() {
    let db = setup_test_db().await;
    let own = create_unit(&db, "West Dining Hall", "WDH").await;
    let other = create_unit(&db, "North Commons", "NCM").await;
    let app = build_router(db, &[]);

    let token = create_jwt("wdh.cook", "staff", Some(own)).unwrap();

    let req = Request::builder()
        .uri(format!("/api/inventory?dining_unit_id={}", other))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let req = Request::builder()
        .uri("/api/inventory")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_only_admin_creates_users() {
    let db = setup_test_db().await;
    let unit = create_unit(&db, "West Dining Hall", "WDH").await;
    let app = build_router(db, &[]);

    let payload = serde_json::json!({
        "username": "ncm.cook",
        "password": "long-enough-pw",
        "role": "staff",
        "dining_unit_id": unit
    });
    let request = |token: String| {
        Request::builder()
            .uri("/api/auth/users")
            .method("POST")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    };

    let manager = create_jwt("wdh.manager", "manager", Some(unit)).unwrap();
    let response = app.clone().oneshot(request(manager)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = create_jwt("root", "admin", None).unwrap();
    let response = app.clone().oneshot(request(admin.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["role"], "staff");
    assert!(body.get("password_hash").is_none());

    // Same username again
    let response = app.oneshot(request(admin)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
