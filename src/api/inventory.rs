//! Inventory handlers: items, movements and the movement log

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
use crate::services::inventory_service::{
    self, ItemChanges, ItemFilter, LogFilter, Movement, NewItem, TransferRequest,
};

#[utoipa::path(
    get,
    path = "/api/inventory",
    tag = "inventory",
    params(ItemFilter),
    responses(
        (status = 200, description = "Items with their total value")
    )
)]
pub async fn list_items(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Query(filter): Query<ItemFilter>,
) -> ApiResult<impl IntoResponse> {
    let items = inventory_service::list_items(&db, &actor, filter).await?;
    let total_value: f64 = items.iter().map(|i| i.extended_value()).sum();
    Ok(Json(json!({
        "items": items,
        "total": items.len(),
        "total_value": crate::utils::money::round_cents(total_value),
    })))
}

#[utoipa::path(
    post,
    path = "/api/inventory",
    tag = "inventory",
    request_body = NewItem,
    responses(
        (status = 201, description = "Item created"),
        (status = 404, description = "Unit not found"),
        (status = 409, description = "SKU already stocked in this unit or unit inactive")
    )
)]
pub async fn create_item(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Json(payload): Json<NewItem>,
) -> ApiResult<impl IntoResponse> {
    let item = inventory_service::create_item(&db, &actor, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/{id}",
    tag = "inventory",
    params(("id" = i32, Path, description = "Inventory item id")),
    responses(
        (status = 200, description = "Item"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(inventory_service::get_item(&db, &actor, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/inventory/{id}",
    tag = "inventory",
    params(("id" = i32, Path, description = "Inventory item id")),
    request_body = ItemChanges,
    responses(
        (status = 200, description = "Updated item"),
        (status = 403, description = "Only managers and admins edit items"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn edit_item(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(changes): Json<ItemChanges>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        inventory_service::edit_item(&db, &actor, id, changes).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/{id}",
    tag = "inventory",
    params(("id" = i32, Path, description = "Inventory item id")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn delete_item(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    inventory_service::delete_item(&db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SkuLookup {
    pub dining_unit_id: i32,
}

/// Barcode scan lookup
#[utoipa::path(
    get,
    path = "/api/inventory/sku/{sku}",
    tag = "inventory",
    params(("sku" = String, Path, description = "Scanned SKU or barcode"), SkuLookup),
    responses(
        (status = 200, description = "Item"),
        (status = 404, description = "SKU not stocked in the unit")
    )
)]
pub async fn lookup_sku(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Path(sku): Path<String>,
    Query(query): Query<SkuLookup>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        inventory_service::find_by_sku(&db, &actor, query.dining_unit_id, &sku).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/inventory/checkin",
    tag = "inventory",
    request_body = Movement,
    responses(
        (status = 200, description = "Item after receiving"),
        (status = 404, description = "SKU not stocked in the unit")
    )
)]
pub async fn check_in(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Json(movement): Json<Movement>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(inventory_service::check_in(&db, &actor, movement).await?))
}

#[utoipa::path(
    post,
    path = "/api/inventory/checkout",
    tag = "inventory",
    request_body = Movement,
    responses(
        (status = 200, description = "Item after issuing"),
        (status = 409, description = "Insufficient stock")
    )
)]
pub async fn check_out(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Json(movement): Json<Movement>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(inventory_service::check_out(&db, &actor, movement).await?))
}

#[utoipa::path(
    post,
    path = "/api/inventory/waste",
    tag = "inventory",
    request_body = Movement,
    responses(
        (status = 200, description = "Item after waste"),
        (status = 409, description = "Insufficient stock")
    )
)]
pub async fn record_waste(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Json(movement): Json<Movement>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        inventory_service::record_waste(&db, &actor, movement).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/inventory/transfer",
    tag = "inventory",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Source and target items"),
        (status = 400, description = "Same source and target unit"),
        (status = 409, description = "Insufficient stock or target unit inactive")
    )
)]
pub async fn transfer(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Json(request): Json<TransferRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(inventory_service::transfer(&db, &actor, request).await?))
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UnitQuery {
    pub dining_unit_id: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/inventory/low-stock",
    tag = "inventory",
    params(UnitQuery),
    responses(
        (status = 200, description = "Items at or below their reorder level")
    )
)]
pub async fn low_stock(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Query(query): Query<UnitQuery>,
) -> ApiResult<impl IntoResponse> {
    let items = inventory_service::low_stock(&db, &actor, query.dining_unit_id).await?;
    Ok(Json(json!({ "items": items, "total": items.len() })))
}

#[utoipa::path(
    get,
    path = "/api/inventory/logs",
    tag = "inventory",
    params(LogFilter),
    responses(
        (status = 200, description = "Movement history, newest first")
    )
)]
pub async fn list_logs(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Query(filter): Query<LogFilter>,
) -> ApiResult<impl IntoResponse> {
    let logs = inventory_service::list_logs(&db, &actor, filter).await?;
    Ok(Json(json!({ "logs": logs, "total": logs.len() })))
}

#[utoipa::path(
    get,
    path = "/api/inventory/value/{unit_id}",
    tag = "inventory",
    params(("unit_id" = i32, Path, description = "Dining unit id")),
    responses(
        (status = 200, description = "Current stock value of the unit")
    )
)]
pub async fn inventory_value(
    actor: Actor,
    State(db): State<DatabaseConnection>,
    Path(unit_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    actor.ensure_unit(unit_id)?;
    let value = inventory_service::inventory_value(&db, unit_id)
        .await
        .map_err(crate::domain::DomainError::from)?;
    Ok(Json(json!({
        "dining_unit_id": unit_id,
        "value": crate::utils::money::round_cents(value),
    })))
}
