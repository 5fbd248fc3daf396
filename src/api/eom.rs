//! Month-end handlers: inventory snapshots and EOM reports

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiResult;
use crate::domain::Actor;
use crate::services::eom_service::{self, EomFilter};
use crate::services::snapshot_service::{self, SnapshotFilter, SnapshotRequest};

#[utoipa::path(
    get,
    path = "/api/snapshots",
    tag = "eom",
    params(SnapshotFilter),
    responses(
        (status = 200, description = "Inventory snapshots")
    )
)]
pub async fn list_snapshots(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Query(filter): Query<SnapshotFilter>,
) -> ApiResult<impl IntoResponse> {
    let snapshots = snapshot_service::list_snapshots(&db, &actor, filter).await?;
    Ok(Json(json!({ "snapshots": snapshots, "total": snapshots.len() })))
}

/// Capture from live stock, or record a manual amount when one is supplied
#[utoipa::path(
    post,
    path = "/api/snapshots",
    tag = "eom",
    request_body = SnapshotRequest,
    responses(
        (status = 200, description = "Stored snapshot"),
        (status = 404, description = "Unit not found")
    )
)]
pub async fn save_snapshot(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Json(payload): Json<SnapshotRequest>,
) -> ApiResult<impl IntoResponse> {
    let snapshot = if payload.amount.is_some() {
        snapshot_service::record_snapshot(&db, &actor, payload).await?
    } else {
        snapshot_service::capture_snapshot(&db, &actor, payload).await?
    };
    Ok((StatusCode::CREATED, Json(snapshot)))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RunEomRequest {
    /// Omit to run every active unit
    pub dining_unit_id: Option<i32>,
    pub month: u32,
    pub year: i32,
}

#[utoipa::path(
    post,
    path = "/api/eom",
    tag = "eom",
    request_body = RunEomRequest,
    responses(
        (status = 200, description = "EOM report with summary and warnings"),
        (status = 400, description = "Ending snapshot missing or invalid period"),
        (status = 403, description = "Role may not run EOM")
    )
)]
pub async fn run_eom(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Json(payload): Json<RunEomRequest>,
) -> ApiResult<axum::response::Response> {
    match payload.dining_unit_id {
        Some(unit_id) => {
            let result =
                eom_service::run_eom(&db, &actor, unit_id, payload.month, payload.year).await?;
            Ok(Json(result).into_response())
        }
        None => {
            let batch =
                eom_service::run_eom_all_units(&db, &actor, payload.month, payload.year).await?;
            Ok(Json(batch).into_response())
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/eom",
    tag = "eom",
    params(EomFilter),
    responses(
        (status = 200, description = "Stored EOM reports")
    )
)]
pub async fn list_reports(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Query(filter): Query<EomFilter>,
) -> ApiResult<impl IntoResponse> {
    let reports = eom_service::list_eom_reports(&db, &actor, filter).await?;
    Ok(Json(json!({ "reports": reports, "total": reports.len() })))
}
