//! Dining unit handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiResult;
use crate::domain::Actor;
use crate::infrastructure::AppState;
use crate::services::unit_service;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UnitQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

#[utoipa::path(
    get,
    path = "/api/units",
    tag = "units",
    params(UnitQuery),
    responses(
        (status = 200, description = "Dining units visible to the caller")
    )
)]
pub async fn list_units(
    actor: Actor,
    State(state): State<AppState>,
    Query(query): Query<UnitQuery>,
) -> ApiResult<impl IntoResponse> {
    let units =
        unit_service::list_units(state.unit_repo.as_ref(), &actor, query.include_inactive).await?;
    Ok(Json(json!({ "units": units, "total": units.len() })))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateUnitRequest {
    pub name: String,
    pub code: String,
}

#[utoipa::path(
    post,
    path = "/api/units",
    tag = "units",
    request_body = CreateUnitRequest,
    responses(
        (status = 201, description = "Unit created"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn create_unit(
    actor: Actor,
    State(state): State<AppState>,
    Json(payload): Json<CreateUnitRequest>,
) -> ApiResult<impl IntoResponse> {
    let unit =
        unit_service::create_unit(state.unit_repo.as_ref(), &actor, &payload.name, &payload.code)
            .await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

#[utoipa::path(
    delete,
    path = "/api/units/{id}",
    tag = "units",
    params(("id" = i32, Path, description = "Dining unit id")),
    responses(
        (status = 200, description = "Unit deactivated"),
        (status = 404, description = "Unit not found")
    )
)]
pub async fn deactivate_unit(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let unit = unit_service::deactivate_unit(state.unit_repo.as_ref(), &actor, id).await?;
    Ok(Json(unit))
}
