use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use sea_orm::DatabaseConnection;

use crate::api::error::ApiResult;
use crate::domain::{Actor, DomainError};
use crate::services::eom_service::EomFilter;
use crate::services::export_service::{self, CsvExport};
use crate::services::inventory_service::{ItemFilter, LogFilter};
use crate::services::invoice_service::InvoiceFilter;
use crate::services::timesheet_service::TimeEntryFilter;

fn csv_response(export: CsvExport) -> ApiResult<impl IntoResponse> {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        export.filename
    ))
    .map_err(|e| DomainError::Internal(e.to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok((StatusCode::OK, headers, export.content))
}

#[utoipa::path(
    get,
    path = "/api/export/inventory",
    tag = "export",
    params(ItemFilter),
    responses(
        (status = 200, description = "Inventory as CSV")
    )
)]
pub async fn export_inventory(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Query(filter): Query<ItemFilter>,
) -> ApiResult<impl IntoResponse> {
    csv_response(export_service::inventory_csv(&db, &actor, filter).await?)
}

#[utoipa::path(
    get,
    path = "/api/export/inventory-logs",
    tag = "export",
    params(LogFilter),
    responses(
        (status = 200, description = "Movement log as CSV")
    )
)]
pub async fn export_inventory_logs(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Query(filter): Query<LogFilter>,
) -> ApiResult<impl IntoResponse> {
    csv_response(export_service::inventory_logs_csv(&db, &actor, filter).await?)
}

#[utoipa::path(
    get,
    path = "/api/export/invoices",
    tag = "export",
    params(InvoiceFilter),
    responses(
        (status = 200, description = "Invoice allocations as CSV")
    )
)]
pub async fn export_invoices(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Query(filter): Query<InvoiceFilter>,
) -> ApiResult<impl IntoResponse> {
    csv_response(export_service::invoices_csv(&db, &actor, filter).await?)
}

#[utoipa::path(
    get,
    path = "/api/export/timesheets",
    tag = "export",
    params(TimeEntryFilter),
    responses(
        (status = 200, description = "Time entries as CSV")
    )
)]
pub async fn export_timesheets(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Query(filter): Query<TimeEntryFilter>,
) -> ApiResult<impl IntoResponse> {
    csv_response(export_service::timesheets_csv(&db, &actor, filter).await?)
}

#[utoipa::path(
    get,
    path = "/api/export/eom",
    tag = "export",
    params(EomFilter),
    responses(
        (status = 200, description = "EOM reports as CSV")
    )
)]
pub async fn export_eom(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Query(filter): Query<EomFilter>,
) -> ApiResult<impl IntoResponse> {
    csv_response(export_service::eom_csv(&db, &actor, filter).await?)
}
