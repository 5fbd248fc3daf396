use crate::api::error::{ApiError, ApiResult};
use crate::auth::{create_jwt, hash_password, verify_password};
use crate::domain::{Actor, DomainError, Role};
use crate::models::user::{self, Entity as User};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    token: String,
    role: String,
    dining_unit_id: Option<i32>,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token, role and unit of the caller"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    tracing::info!("Login attempt for user: {}", payload.username);

    let user = match User::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(&db)
        .await
    {
        Ok(Some(u)) => u,
        Ok(None) => {
            tracing::warn!("User not found: {}", payload.username);
            return invalid_credentials();
        }
        Err(e) => return ApiError(e.into()).into_response(),
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => match create_jwt(&user.username, &user.role, user.dining_unit_id) {
            Ok(token) => {
                tracing::info!("User {} signed in", user.username);
                (
                    StatusCode::OK,
                    Json(LoginResponse {
                        token,
                        role: user.role,
                        dining_unit_id: user.dining_unit_id,
                    }),
                )
                    .into_response()
            }
            Err(e) => ApiError(DomainError::Internal(e)).into_response(),
        },
        _ => {
            tracing::warn!("Password verification failed for user: {}", user.username);
            invalid_credentials()
        }
    }
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Invalid credentials" })),
    )
        .into_response()
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    username: String,
    password: String,
    role: String,
    dining_unit_id: Option<i32>,
}

/// Admin creates an account for a colleague
#[utoipa::path(
    post,
    path = "/api/auth/users",
    tag = "auth",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn create_user(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.ensure_role(&[Role::Admin])?;

    let username = payload.username.trim().to_string();
    if username.is_empty() {
        return Err(DomainError::validation("username is required").into());
    }
    if payload.password.len() < 8 {
        return Err(DomainError::validation("password must be at least 8 characters").into());
    }
    let role: Role = payload.role.parse()?;
    if !role.is_cross_unit() && payload.dining_unit_id.is_none() {
        return Err(DomainError::validation(format!("a {} must belong to a dining unit", role)).into());
    }

    let password_hash = hash_password(&payload.password).map_err(DomainError::Internal)?;
    let now = chrono::Utc::now().to_rfc3339();
    let user = user::ActiveModel {
        username: Set(username),
        password_hash: Set(password_hash),
        role: Set(role.as_str().to_owned()),
        dining_unit_id: Set(payload.dining_unit_id),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await
    .map_err(DomainError::from)?;

    tracing::info!("{} created {} account {}", actor.username, user.role, user.username);
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_me(actor: Actor, State(db): State<DatabaseConnection>) -> ApiResult<impl IntoResponse> {
    let user = User::find()
        .filter(user::Column::Username.eq(&actor.username))
        .one(&db)
        .await
        .map_err(DomainError::from)?
        .ok_or_else(|| DomainError::not_found("User"))?;

    Ok(Json(json!({
        "username": user.username,
        "role": actor.role,
        "dining_unit_id": user.dining_unit_id,
        "scope": format!("{:?}", actor.scope()),
    })))
}
