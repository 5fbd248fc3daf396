//! Invoice and deposit transmittal handlers

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
use crate::services::invoice_service::{self, InvoiceFilter, SubmitInvoice};
use crate::services::transmittal_service::{self, NewTransmittal, TransmittalFilter};

#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "invoices",
    params(InvoiceFilter),
    responses(
        (status = 200, description = "Invoices visible to the caller")
    )
)]
pub async fn list_invoices(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Query(filter): Query<InvoiceFilter>,
) -> ApiResult<impl IntoResponse> {
    let invoices = invoice_service::list_invoices(&db, &actor, filter).await?;
    Ok(Json(json!({ "invoices": invoices, "total": invoices.len() })))
}

#[utoipa::path(
    post,
    path = "/api/invoices",
    tag = "invoices",
    request_body = SubmitInvoice,
    responses(
        (status = 201, description = "Invoice submitted"),
        (status = 400, description = "Invalid invoice or allocations"),
        (status = 403, description = "Allocation outside the caller's units"),
        (status = 409, description = "Invoice number already submitted")
    )
)]
pub async fn submit_invoice(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Json(payload): Json<SubmitInvoice>,
) -> ApiResult<impl IntoResponse> {
    let invoice = invoice_service::submit_invoice(&db, &actor, payload).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "invoices",
    params(("id" = i32, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice"),
        (status = 404, description = "Invoice not found")
    )
)]
pub async fn get_invoice(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(invoice_service::get_invoice(&db, &actor, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/invoices/{id}/process",
    tag = "invoices",
    params(("id" = i32, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Processed invoice"),
        (status = 403, description = "Only accounting processes invoices"),
        (status = 409, description = "Invoice already processed")
    )
)]
pub async fn process_invoice(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(invoice_service::process_invoice(&db, &actor, id).await?))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AttachmentRequest {
    /// Storage path or URL of the scanned invoice
    pub reference: String,
}

#[utoipa::path(
    post,
    path = "/api/invoices/{id}/attachments",
    tag = "invoices",
    params(("id" = i32, Path, description = "Invoice id")),
    request_body = AttachmentRequest,
    responses(
        (status = 200, description = "Invoice with the new attachment")
    )
)]
pub async fn add_attachment(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<AttachmentRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        invoice_service::add_attachment(&db, &actor, id, &payload.reference).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    tag = "invoices",
    params(("id" = i32, Path, description = "Invoice id")),
    responses(
        (status = 204, description = "Invoice deleted"),
        (status = 409, description = "Processed invoices cannot be deleted")
    )
)]
pub async fn delete_invoice(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    invoice_service::delete_invoice(&db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Deposit transmittals ---

#[utoipa::path(
    get,
    path = "/api/transmittals",
    tag = "transmittals",
    params(TransmittalFilter),
    responses(
        (status = 200, description = "Deposit transmittals visible to the caller")
    )
)]
pub async fn list_transmittals(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Query(filter): Query<TransmittalFilter>,
) -> ApiResult<impl IntoResponse> {
    let transmittals = transmittal_service::list_transmittals(&db, &actor, filter).await?;
    Ok(Json(json!({ "transmittals": transmittals, "total": transmittals.len() })))
}

#[utoipa::path(
    post,
    path = "/api/transmittals",
    tag = "transmittals",
    request_body = NewTransmittal,
    responses(
        (status = 201, description = "Transmittal recorded"),
        (status = 404, description = "Unit not found")
    )
)]
pub async fn create_transmittal(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Json(payload): Json<NewTransmittal>,
) -> ApiResult<impl IntoResponse> {
    let transmittal = transmittal_service::create_transmittal(&db, &actor, payload).await?;
    Ok((StatusCode::CREATED, Json(transmittal)))
}

#[utoipa::path(
    get,
    path = "/api/transmittals/{id}",
    tag = "transmittals",
    params(("id" = i32, Path, description = "Transmittal id")),
    responses(
        (status = 200, description = "Transmittal"),
        (status = 404, description = "Transmittal not found")
    )
)]
pub async fn get_transmittal(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        transmittal_service::get_transmittal(&db, &actor, id).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/transmittals/{id}/verify",
    tag = "transmittals",
    params(("id" = i32, Path, description = "Transmittal id")),
    responses(
        (status = 200, description = "Verified transmittal"),
        (status = 409, description = "Transmittal already verified")
    )
)]
pub async fn verify_transmittal(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        transmittal_service::verify_transmittal(&db, &actor, id).await?,
    ))
}
