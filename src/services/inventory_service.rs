//! Inventory Service - stock movements across dining units
//!
//! Every quantity change writes one `inventory_logs` row in the same
//! transaction as the item update, so the log can be replayed against the
//! item table.

use sea_orm::*;

use crate::domain::{Actor, DomainError, InventoryAction, Role};
use crate::models::inventory_item::{self, Entity as InventoryItem};
use crate::models::inventory_log::{self, Entity as InventoryLog};
use crate::services::unit_service::require_active_unit;
use crate::utils::dates;

/// Filter parameters for listing items
#[derive(Debug, Default, Clone, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemFilter {
    pub dining_unit_id: Option<i32>,
    pub category: Option<String>,
    /// Matches SKU or name
    pub search: Option<String>,
    #[serde(default)]
    pub low_stock_only: bool,
}

/// Input for creating an item
#[derive(Debug, Clone, serde::Deserialize, utoipa::ToSchema)]
pub struct NewItem {
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub uom: Option<String>,
    #[serde(default)]
    pub qty_on_hand: f64,
    #[serde(default)]
    pub unit_price: f64,
    pub dining_unit_id: i32,
    #[serde(default)]
    pub reorder_level: f64,
}

/// Partial update of an item; `None` leaves a field untouched
#[derive(Debug, Default, Clone, serde::Deserialize, utoipa::ToSchema)]
pub struct ItemChanges {
    pub name: Option<String>,
    /// `null` clears the category
    #[serde(default, deserialize_with = "present_or_null")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    pub uom: Option<String>,
    pub unit_price: Option<f64>,
    pub reorder_level: Option<f64>,
    /// Physical count correction
    pub qty_on_hand: Option<f64>,
    pub notes: Option<String>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    <Option<String> as serde::Deserialize>::deserialize(deserializer).map(Some)
}

/// A single-unit stock movement (check-in, check-out, waste)
#[derive(Debug, Clone, serde::Deserialize, utoipa::ToSchema)]
pub struct Movement {
    pub dining_unit_id: i32,
    pub sku: String,
    pub quantity: f64,
    /// Check-in only: replaces the item's unit price
    pub unit_price: Option<f64>,
    /// Business date, defaults to today
    pub date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize, utoipa::ToSchema)]
pub struct TransferRequest {
    pub from_unit_id: i32,
    pub to_unit_id: i32,
    pub sku: String,
    pub quantity: f64,
    pub date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TransferOutcome {
    pub source: inventory_item::Model,
    pub target: inventory_item::Model,
}

/// Filter parameters for the movement log
#[derive(Debug, Default, Clone, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogFilter {
    pub dining_unit_id: Option<i32>,
    pub action: Option<InventoryAction>,
    pub sku: Option<String>,
    /// Inclusive, YYYY-MM-DD
    pub from_date: Option<String>,
    /// Inclusive, YYYY-MM-DD
    pub to_date: Option<String>,
}

struct LogEntry<'a> {
    item: &'a inventory_item::Model,
    action: InventoryAction,
    quantity: f64,
    unit_price: f64,
    target_unit_id: Option<i32>,
    log_date: String,
    performed_by: &'a str,
    notes: Option<String>,
}

fn require_positive(value: f64, field: &str) -> Result<(), DomainError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::validation(format!(
            "{} must be greater than zero",
            field
        )));
    }
    Ok(())
}

fn require_non_negative(value: f64, field: &str) -> Result<(), DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!(
            "{} cannot be negative",
            field
        )));
    }
    Ok(())
}

fn require_text(value: &str, field: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

async fn write_log<C: ConnectionTrait>(conn: &C, entry: LogEntry<'_>) -> Result<(), DbErr> {
    let log = inventory_log::ActiveModel {
        inventory_id: Set(Some(entry.item.id)),
        sku: Set(entry.item.sku.clone()),
        item_name: Set(entry.item.name.clone()),
        action: Set(entry.action.as_str().to_owned()),
        quantity: Set(entry.quantity),
        unit_price: Set(entry.unit_price),
        dining_unit_id: Set(entry.item.dining_unit_id),
        target_unit_id: Set(entry.target_unit_id),
        log_date: Set(entry.log_date),
        performed_by: Set(entry.performed_by.to_owned()),
        notes: Set(entry.notes),
        created_at: Set(dates::now_rfc3339()),
        ..Default::default()
    };
    log.insert(conn).await?;
    Ok(())
}

pub(crate) async fn item_by_sku<C: ConnectionTrait>(
    conn: &C,
    unit_id: i32,
    sku: &str,
) -> Result<Option<inventory_item::Model>, DbErr> {
    InventoryItem::find()
        .filter(inventory_item::Column::DiningUnitId.eq(unit_id))
        .filter(inventory_item::Column::Sku.eq(sku.trim()))
        .one(conn)
        .await
}

async fn require_item_by_sku<C: ConnectionTrait>(
    conn: &C,
    unit_id: i32,
    sku: &str,
) -> Result<inventory_item::Model, DomainError> {
    item_by_sku(conn, unit_id, sku).await?.ok_or_else(|| {
        DomainError::not_found(format!("SKU {} in dining unit {}", sku.trim(), unit_id))
    })
}

/// Change on-hand quantity by `delta` and return the updated row.
async fn adjust_quantity<C: ConnectionTrait>(
    conn: &C,
    item: inventory_item::Model,
    delta: f64,
    new_price: Option<f64>,
) -> Result<inventory_item::Model, DomainError> {
    let new_qty = item.qty_on_hand + delta;
    if new_qty < -1e-9 {
        return Err(DomainError::InvalidState(format!(
            "Insufficient stock for {}: {} {} on hand, {} requested",
            item.sku,
            item.qty_on_hand,
            item.uom,
            -delta
        )));
    }

    let mut active: inventory_item::ActiveModel = item.into();
    active.qty_on_hand = Set(new_qty.max(0.0));
    if let Some(price) = new_price {
        active.unit_price = Set(price);
    }
    active.updated_at = Set(dates::now_rfc3339());
    Ok(active.update(conn).await?)
}

/// List items with optional filters, restricted to the actor's units
pub async fn list_items(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: ItemFilter,
) -> Result<Vec<inventory_item::Model>, DomainError> {
    let mut condition = Condition::all();

    if let Some(unit_id) = actor.unit_filter(filter.dining_unit_id)? {
        condition = condition.add(inventory_item::Column::DiningUnitId.eq(unit_id));
    }

    if let Some(category) = filter.category
        && !category.is_empty()
    {
        condition = condition.add(inventory_item::Column::Category.eq(category));
    }

    if let Some(search) = filter.search
        && !search.is_empty()
    {
        condition = condition.add(
            Condition::any()
                .add(inventory_item::Column::Sku.contains(&search))
                .add(inventory_item::Column::Name.contains(&search)),
        );
    }

    let items = InventoryItem::find()
        .filter(condition)
        .order_by_asc(inventory_item::Column::DiningUnitId)
        .order_by_asc(inventory_item::Column::Name)
        .all(db)
        .await?;

    if filter.low_stock_only {
        return Ok(items.into_iter().filter(|i| i.is_low_stock()).collect());
    }

    Ok(items)
}

pub async fn get_item(
    db: &DatabaseConnection,
    actor: &Actor,
    id: i32,
) -> Result<inventory_item::Model, DomainError> {
    let item = InventoryItem::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Inventory item"))?;
    actor.ensure_unit(item.dining_unit_id)?;
    Ok(item)
}

/// Barcode lookup: resolve a scanned SKU inside one unit
pub async fn find_by_sku(
    db: &DatabaseConnection,
    actor: &Actor,
    unit_id: i32,
    sku: &str,
) -> Result<inventory_item::Model, DomainError> {
    actor.ensure_unit(unit_id)?;
    require_item_by_sku(db, unit_id, sku).await
}

/// Create a new item; a non-zero opening quantity is logged as a check-in
pub async fn create_item(
    db: &DatabaseConnection,
    actor: &Actor,
    input: NewItem,
) -> Result<inventory_item::Model, DomainError> {
    actor.ensure_unit(input.dining_unit_id)?;
    let sku = require_text(&input.sku, "sku")?;
    let name = require_text(&input.name, "name")?;
    require_non_negative(input.qty_on_hand, "qty_on_hand")?;
    require_non_negative(input.unit_price, "unit_price")?;
    require_non_negative(input.reorder_level, "reorder_level")?;

    let txn = db.begin().await?;
    require_active_unit(&txn, input.dining_unit_id).await?;

    if item_by_sku(&txn, input.dining_unit_id, &sku).await?.is_some() {
        return Err(DomainError::Conflict(format!(
            "SKU {} already exists in dining unit {}",
            sku, input.dining_unit_id
        )));
    }

    let now = dates::now_rfc3339();
    let new_item = inventory_item::ActiveModel {
        sku: Set(sku),
        name: Set(name),
        category: Set(input.category.filter(|c| !c.trim().is_empty())),
        uom: Set(input
            .uom
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| "each".to_string())),
        qty_on_hand: Set(input.qty_on_hand),
        unit_price: Set(input.unit_price),
        dining_unit_id: Set(input.dining_unit_id),
        reorder_level: Set(input.reorder_level),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let item = new_item.insert(&txn).await?;

    if item.qty_on_hand > 0.0 {
        write_log(
            &txn,
            LogEntry {
                item: &item,
                action: InventoryAction::CheckIn,
                quantity: item.qty_on_hand,
                unit_price: item.unit_price,
                target_unit_id: None,
                log_date: dates::today(),
                performed_by: &actor.username,
                notes: Some("Opening quantity".to_string()),
            },
        )
        .await?;
    }

    txn.commit().await?;
    tracing::info!(
        "{} created item {} in unit {}",
        actor.username,
        item.sku,
        item.dining_unit_id
    );
    Ok(item)
}

/// Receive stock into a unit
pub async fn check_in(
    db: &DatabaseConnection,
    actor: &Actor,
    movement: Movement,
) -> Result<inventory_item::Model, DomainError> {
    actor.ensure_unit(movement.dining_unit_id)?;
    require_positive(movement.quantity, "quantity")?;
    if let Some(price) = movement.unit_price {
        require_non_negative(price, "unit_price")?;
    }
    let log_date = dates::date_or_today(movement.date.as_deref())?;

    let txn = db.begin().await?;
    let item = require_item_by_sku(&txn, movement.dining_unit_id, &movement.sku).await?;
    let updated = adjust_quantity(&txn, item, movement.quantity, movement.unit_price).await?;

    write_log(
        &txn,
        LogEntry {
            item: &updated,
            action: InventoryAction::CheckIn,
            quantity: movement.quantity,
            unit_price: updated.unit_price,
            target_unit_id: None,
            log_date,
            performed_by: &actor.username,
            notes: movement.notes,
        },
    )
    .await?;

    txn.commit().await?;
    tracing::debug!(
        "Checked in {} x {} at unit {}",
        movement.quantity,
        updated.sku,
        updated.dining_unit_id
    );
    Ok(updated)
}

/// Debit stock inside a caller-owned transaction and log the movement
#[allow(clippy::too_many_arguments)]
pub(crate) async fn consume<C: ConnectionTrait>(
    conn: &C,
    performed_by: &str,
    unit_id: i32,
    sku: &str,
    quantity: f64,
    action: InventoryAction,
    log_date: String,
    notes: Option<String>,
) -> Result<inventory_item::Model, DomainError> {
    let item = require_item_by_sku(conn, unit_id, sku).await?;
    let price = item.unit_price;
    let updated = adjust_quantity(conn, item, -quantity, None).await?;

    write_log(
        conn,
        LogEntry {
            item: &updated,
            action,
            quantity,
            unit_price: price,
            target_unit_id: None,
            log_date,
            performed_by,
            notes,
        },
    )
    .await?;

    Ok(updated)
}

async fn take_out(
    db: &DatabaseConnection,
    actor: &Actor,
    movement: Movement,
    action: InventoryAction,
) -> Result<inventory_item::Model, DomainError> {
    actor.ensure_unit(movement.dining_unit_id)?;
    require_positive(movement.quantity, "quantity")?;
    let log_date = dates::date_or_today(movement.date.as_deref())?;

    let txn = db.begin().await?;
    let updated = consume(
        &txn,
        &actor.username,
        movement.dining_unit_id,
        &movement.sku,
        movement.quantity,
        action,
        log_date,
        movement.notes,
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Issue stock out of a unit
pub async fn check_out(
    db: &DatabaseConnection,
    actor: &Actor,
    movement: Movement,
) -> Result<inventory_item::Model, DomainError> {
    take_out(db, actor, movement, InventoryAction::CheckOut).await
}

/// Write off spoiled or discarded stock at its current price
pub async fn record_waste(
    db: &DatabaseConnection,
    actor: &Actor,
    movement: Movement,
) -> Result<inventory_item::Model, DomainError> {
    let sku = movement.sku.clone();
    let quantity = movement.quantity;
    let item = take_out(db, actor, movement, InventoryAction::Waste).await?;
    tracing::info!(
        "{} recorded waste of {} x {} at unit {}",
        actor.username,
        quantity,
        sku,
        item.dining_unit_id
    );
    Ok(item)
}

/// Move stock between units, creating the target row when the SKU is new there
pub async fn transfer(
    db: &DatabaseConnection,
    actor: &Actor,
    request: TransferRequest,
) -> Result<TransferOutcome, DomainError> {
    actor.ensure_unit(request.from_unit_id)?;
    require_positive(request.quantity, "quantity")?;
    if request.from_unit_id == request.to_unit_id {
        return Err(DomainError::validation(
            "source and target unit must differ",
        ));
    }
    let log_date = dates::date_or_today(request.date.as_deref())?;

    let txn = db.begin().await?;
    require_active_unit(&txn, request.to_unit_id).await?;

    let source_item = require_item_by_sku(&txn, request.from_unit_id, &request.sku).await?;
    let price = source_item.unit_price;
    let source = adjust_quantity(&txn, source_item, -request.quantity, None).await?;

    let target = match item_by_sku(&txn, request.to_unit_id, &source.sku).await? {
        Some(existing) => adjust_quantity(&txn, existing, request.quantity, None).await?,
        None => {
            let now = dates::now_rfc3339();
            inventory_item::ActiveModel {
                sku: Set(source.sku.clone()),
                name: Set(source.name.clone()),
                category: Set(source.category.clone()),
                uom: Set(source.uom.clone()),
                qty_on_hand: Set(request.quantity),
                unit_price: Set(price),
                dining_unit_id: Set(request.to_unit_id),
                reorder_level: Set(0.0),
                created_at: Set(now.clone()),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    write_log(
        &txn,
        LogEntry {
            item: &source,
            action: InventoryAction::Transfer,
            quantity: request.quantity,
            unit_price: price,
            target_unit_id: Some(request.to_unit_id),
            log_date,
            performed_by: &actor.username,
            notes: request.notes,
        },
    )
    .await?;

    txn.commit().await?;
    tracing::info!(
        "{} transferred {} x {} from unit {} to unit {}",
        actor.username,
        request.quantity,
        source.sku,
        request.from_unit_id,
        request.to_unit_id
    );
    Ok(TransferOutcome { source, target })
}

/// Edit item attributes or correct the on-hand count (managers and admins)
pub async fn edit_item(
    db: &DatabaseConnection,
    actor: &Actor,
    id: i32,
    changes: ItemChanges,
) -> Result<inventory_item::Model, DomainError> {
    actor.ensure_role(&[Role::Admin, Role::Manager])?;

    let txn = db.begin().await?;
    let item = InventoryItem::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| DomainError::not_found("Inventory item"))?;
    actor.ensure_unit(item.dining_unit_id)?;

    let old_qty = item.qty_on_hand;
    let mut active: inventory_item::ActiveModel = item.into();

    if let Some(name) = changes.name {
        active.name = Set(require_text(&name, "name")?);
    }
    if let Some(category) = changes.category {
        active.category = Set(category.filter(|c| !c.trim().is_empty()));
    }
    if let Some(uom) = changes.uom {
        active.uom = Set(require_text(&uom, "uom")?);
    }
    if let Some(price) = changes.unit_price {
        require_non_negative(price, "unit_price")?;
        active.unit_price = Set(price);
    }
    if let Some(level) = changes.reorder_level {
        require_non_negative(level, "reorder_level")?;
        active.reorder_level = Set(level);
    }
    if let Some(qty) = changes.qty_on_hand {
        require_non_negative(qty, "qty_on_hand")?;
        active.qty_on_hand = Set(qty);
    }
    active.updated_at = Set(dates::now_rfc3339());

    let updated = active.update(&txn).await?;

    write_log(
        &txn,
        LogEntry {
            item: &updated,
            action: InventoryAction::Edit,
            quantity: updated.qty_on_hand - old_qty,
            unit_price: updated.unit_price,
            target_unit_id: None,
            log_date: dates::today(),
            performed_by: &actor.username,
            notes: changes.notes,
        },
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Remove an item; the log keeps the quantity that disappeared with it
pub async fn delete_item(
    db: &DatabaseConnection,
    actor: &Actor,
    id: i32,
) -> Result<(), DomainError> {
    actor.ensure_role(&[Role::Admin, Role::Manager])?;

    let txn = db.begin().await?;
    let item = InventoryItem::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| DomainError::not_found("Inventory item"))?;
    actor.ensure_unit(item.dining_unit_id)?;

    write_log(
        &txn,
        LogEntry {
            item: &item,
            action: InventoryAction::Delete,
            quantity: item.qty_on_hand,
            unit_price: item.unit_price,
            target_unit_id: None,
            log_date: dates::today(),
            performed_by: &actor.username,
            notes: None,
        },
    )
    .await?;

    // Log rows outlive the item
    InventoryLog::update_many()
        .col_expr(
            inventory_log::Column::InventoryId,
            sea_query::Expr::value(Option::<i32>::None),
        )
        .filter(inventory_log::Column::InventoryId.eq(item.id))
        .exec(&txn)
        .await?;

    InventoryItem::delete_by_id(item.id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(
        "{} deleted item {} from unit {}",
        actor.username,
        item.sku,
        item.dining_unit_id
    );
    Ok(())
}

/// Items at or below their reorder level
pub async fn low_stock(
    db: &DatabaseConnection,
    actor: &Actor,
    unit_id: Option<i32>,
) -> Result<Vec<inventory_item::Model>, DomainError> {
    list_items(
        db,
        actor,
        ItemFilter {
            dining_unit_id: unit_id,
            low_stock_only: true,
            ..Default::default()
        },
    )
    .await
}

/// Movement history, newest first
pub async fn list_logs(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: LogFilter,
) -> Result<Vec<inventory_log::Model>, DomainError> {
    let mut condition = Condition::all();

    // A unit also sees transfers it received
    if let Some(unit_id) = actor.unit_filter(filter.dining_unit_id)? {
        condition = condition.add(
            Condition::any()
                .add(inventory_log::Column::DiningUnitId.eq(unit_id))
                .add(inventory_log::Column::TargetUnitId.eq(unit_id)),
        );
    }
    if let Some(action) = filter.action {
        condition = condition.add(inventory_log::Column::Action.eq(action.as_str()));
    }
    if let Some(sku) = filter.sku
        && !sku.is_empty()
    {
        condition = condition.add(inventory_log::Column::Sku.eq(sku));
    }
    if let Some(from) = filter.from_date {
        condition = condition.add(inventory_log::Column::LogDate.gte(dates::parse_date(&from)?));
    }
    if let Some(to) = filter.to_date {
        condition = condition.add(inventory_log::Column::LogDate.lte(dates::parse_date(&to)?));
    }

    Ok(InventoryLog::find()
        .filter(condition)
        .order_by_desc(inventory_log::Column::LogDate)
        .order_by_desc(inventory_log::Column::Id)
        .all(db)
        .await?)
}

/// Extended value (Σ qty × price) of a unit's inventory right now
pub async fn inventory_value<C: ConnectionTrait>(conn: &C, unit_id: i32) -> Result<f64, DbErr> {
    let items = InventoryItem::find()
        .filter(inventory_item::Column::DiningUnitId.eq(unit_id))
        .all(conn)
        .await?;
    Ok(items.iter().map(|i| i.extended_value()).sum())
}
