//! Snapshot Service - month boundary inventory valuations

use sea_orm::*;

use crate::domain::{Actor, DomainError, Role, SnapshotKind};
use crate::models::inventory_snapshot::{self, Entity as InventorySnapshot};
use crate::services::inventory_service;
use crate::services::unit_service::require_unit;
use crate::utils::{dates, money};

#[derive(Debug, Clone, serde::Deserialize, utoipa::ToSchema)]
pub struct SnapshotRequest {
    pub dining_unit_id: i32,
    pub month: u32,
    pub year: i32,
    #[serde(rename = "type")]
    pub kind: SnapshotKind,
    /// Only used for manual entries
    pub amount: Option<f64>,
}

#[derive(Debug, Default, Clone, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SnapshotFilter {
    pub dining_unit_id: Option<i32>,
    pub year: Option<i32>,
}

const SNAPSHOT_ROLES: &[Role] = &[Role::Admin, Role::Accounting, Role::Manager];

pub(crate) async fn find_snapshot<C: ConnectionTrait>(
    conn: &C,
    unit_id: i32,
    month: u32,
    year: i32,
    kind: SnapshotKind,
) -> Result<Option<inventory_snapshot::Model>, DbErr> {
    InventorySnapshot::find()
        .filter(inventory_snapshot::Column::DiningUnitId.eq(unit_id))
        .filter(inventory_snapshot::Column::Month.eq(month as i32))
        .filter(inventory_snapshot::Column::Year.eq(year))
        .filter(inventory_snapshot::Column::Kind.eq(kind.as_str()))
        .one(conn)
        .await
}

/// Insert or replace the snapshot for (unit, month, year, kind)
async fn upsert<C: ConnectionTrait>(
    conn: &C,
    unit_id: i32,
    month: u32,
    year: i32,
    kind: SnapshotKind,
    amount: f64,
    captured_by: &str,
) -> Result<inventory_snapshot::Model, DbErr> {
    let now = dates::now_rfc3339();
    match find_snapshot(conn, unit_id, month, year, kind).await? {
        Some(existing) => {
            let mut active: inventory_snapshot::ActiveModel = existing.into();
            active.amount = Set(amount);
            active.captured_by = Set(captured_by.to_owned());
            active.captured_at = Set(now);
            active.update(conn).await
        }
        None => {
            inventory_snapshot::ActiveModel {
                dining_unit_id: Set(unit_id),
                month: Set(month as i32),
                year: Set(year),
                kind: Set(kind.as_str().to_owned()),
                amount: Set(amount),
                captured_by: Set(captured_by.to_owned()),
                captured_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await
        }
    }
}

/// Write a snapshot; an ending snapshot seeds next month's beginning
/// snapshot when that one does not exist yet.
async fn store(
    db: &DatabaseConnection,
    actor: &Actor,
    unit_id: i32,
    month: u32,
    year: i32,
    kind: SnapshotKind,
    amount: f64,
) -> Result<inventory_snapshot::Model, DomainError> {
    let txn = db.begin().await?;
    let snapshot = upsert(&txn, unit_id, month, year, kind, amount, &actor.username).await?;

    if kind == SnapshotKind::Ending {
        let (next_month, next_year) = dates::next_period(month, year);
        if find_snapshot(&txn, unit_id, next_month, next_year, SnapshotKind::Beginning)
            .await?
            .is_none()
        {
            upsert(
                &txn,
                unit_id,
                next_month,
                next_year,
                SnapshotKind::Beginning,
                amount,
                &actor.username,
            )
            .await?;
            tracing::debug!(
                "carried {:.2} forward as beginning inventory for unit {} {}/{}",
                amount,
                unit_id,
                next_month,
                next_year
            );
        }
    }

    txn.commit().await?;
    tracing::info!(
        "{} stored {} snapshot for unit {} {}/{}: {:.2}",
        actor.username,
        kind,
        unit_id,
        month,
        year,
        amount
    );
    Ok(snapshot)
}

/// Value the unit's current stock and record it for the period
pub async fn capture_snapshot(
    db: &DatabaseConnection,
    actor: &Actor,
    request: SnapshotRequest,
) -> Result<inventory_snapshot::Model, DomainError> {
    actor.ensure_role(SNAPSHOT_ROLES)?;
    actor.ensure_unit(request.dining_unit_id)?;
    dates::validate_period(request.month, request.year)?;
    require_unit(db, request.dining_unit_id).await?;

    let amount = money::round_cents(inventory_service::inventory_value(db, request.dining_unit_id).await?);
    store(
        db,
        actor,
        request.dining_unit_id,
        request.month,
        request.year,
        request.kind,
        amount,
    )
    .await
}

/// Enter a valuation by hand, typically for months before the system was used
pub async fn record_snapshot(
    db: &DatabaseConnection,
    actor: &Actor,
    request: SnapshotRequest,
) -> Result<inventory_snapshot::Model, DomainError> {
    actor.ensure_role(SNAPSHOT_ROLES)?;
    actor.ensure_unit(request.dining_unit_id)?;
    dates::validate_period(request.month, request.year)?;
    require_unit(db, request.dining_unit_id).await?;

    let amount = request
        .amount
        .ok_or_else(|| DomainError::validation("amount is required"))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(DomainError::validation("amount cannot be negative"));
    }

    store(
        db,
        actor,
        request.dining_unit_id,
        request.month,
        request.year,
        request.kind,
        money::round_cents(amount),
    )
    .await
}

pub async fn list_snapshots(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: SnapshotFilter,
) -> Result<Vec<inventory_snapshot::Model>, DomainError> {
    let mut query = InventorySnapshot::find();

    if let Some(unit_id) = actor.unit_filter(filter.dining_unit_id)? {
        query = query.filter(inventory_snapshot::Column::DiningUnitId.eq(unit_id));
    }
    if let Some(year) = filter.year {
        query = query.filter(inventory_snapshot::Column::Year.eq(year));
    }

    Ok(query
        .order_by_desc(inventory_snapshot::Column::Year)
        .order_by_desc(inventory_snapshot::Column::Month)
        .order_by_asc(inventory_snapshot::Column::DiningUnitId)
        .order_by_asc(inventory_snapshot::Column::Kind)
        .all(db)
        .await?)
}
