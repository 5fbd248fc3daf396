//! Temp labor handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiResult;
use crate::domain::Actor;
use crate::services::timesheet_service::{
    self, NewAgency, NewTimeEntry, ReviewDecision, TimeEntryFilter,
};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AgencyQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

#[utoipa::path(
    get,
    path = "/api/timesheets/agencies",
    tag = "timesheets",
    params(AgencyQuery),
    responses(
        (status = 200, description = "Temp agencies")
    )
)]
pub async fn list_agencies(
    _actor: Actor,
    State(db): State<DatabaseConnection>,
    Query(query): Query<AgencyQuery>,
) -> ApiResult<impl IntoResponse> {
    let agencies = timesheet_service::list_agencies(&db, query.include_inactive).await?;
    Ok(Json(json!({ "agencies": agencies, "total": agencies.len() })))
}

#[utoipa::path(
    post,
    path = "/api/timesheets/agencies",
    tag = "timesheets",
    request_body = NewAgency,
    responses(
        (status = 201, description = "Agency created"),
        (status = 403, description = "Only admin and accounting add agencies")
    )
)]
pub async fn create_agency(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Json(payload): Json<NewAgency>,
) -> ApiResult<impl IntoResponse> {
    let agency = timesheet_service::create_agency(&db, &actor, payload).await?;
    Ok((StatusCode::CREATED, Json(agency)))
}

#[utoipa::path(
    get,
    path = "/api/timesheets",
    tag = "timesheets",
    params(TimeEntryFilter),
    responses(
        (status = 200, description = "Time entries with agency and cost")
    )
)]
pub async fn list_entries(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Query(filter): Query<TimeEntryFilter>,
) -> ApiResult<impl IntoResponse> {
    let entries = timesheet_service::list_entries(&db, &actor, filter).await?;
    Ok(Json(json!({ "entries": entries, "total": entries.len() })))
}

#[utoipa::path(
    post,
    path = "/api/timesheets",
    tag = "timesheets",
    request_body = NewTimeEntry,
    responses(
        (status = 201, description = "Entry submitted"),
        (status = 400, description = "Invalid hours or rate"),
        (status = 404, description = "Unit or agency not found")
    )
)]
pub async fn submit_entry(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Json(payload): Json<NewTimeEntry>,
) -> ApiResult<impl IntoResponse> {
    let entry = timesheet_service::submit_entry(&db, &actor, payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
}

#[utoipa::path(
    put,
    path = "/api/timesheets/{id}/review",
    tag = "timesheets",
    params(("id" = i32, Path, description = "Time entry id")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Reviewed entry"),
        (status = 409, description = "Entry already reviewed")
    )
)]
pub async fn review_entry(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<ReviewRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        timesheet_service::review_entry(&db, &actor, id, payload.decision).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/timesheets/summary",
    tag = "timesheets",
    params(TimeEntryFilter),
    responses(
        (status = 200, description = "Approved labor cost per agency")
    )
)]
pub async fn labor_summary(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Query(filter): Query<TimeEntryFilter>,
) -> ApiResult<impl IntoResponse> {
    let summary = timesheet_service::labor_summary(&db, &actor, filter).await?;
    let total_cost: f64 = summary.iter().map(|s| s.cost).sum();
    Ok(Json(json!({
        "agencies": summary,
        "total_cost": crate::utils::money::round_cents(total_cost),
    })))
}
