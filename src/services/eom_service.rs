//! EOM Service - end-of-month cost of goods sold and plate cost

use sea_orm::*;
use serde::Serialize;

use crate::domain::{Actor, DomainError, InventoryAction, Role, SnapshotKind};
use crate::models::dining_unit::{self, Entity as DiningUnit};
use crate::models::eom_report::{self, Entity as EomReport};
use crate::models::inventory_log::{self, Entity as InventoryLog};
use crate::services::{invoice_service, recipe_service, snapshot_service};
use crate::utils::{dates, money};

/// Raw figures for one unit and month
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EomInputs {
    pub beginning_inventory: f64,
    pub purchases: f64,
    pub transfers_in: f64,
    pub transfers_out: f64,
    pub ending_inventory: f64,
    pub waste: f64,
    pub servings: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, utoipa::ToSchema)]
pub struct EomSummary {
    pub beginning_inventory: f64,
    pub purchases: f64,
    pub transfers_in: f64,
    pub transfers_out: f64,
    pub ending_inventory: f64,
    pub waste: f64,
    pub cogs: f64,
    pub servings: f64,
    pub plate_cost: Option<f64>,
    /// Waste as a fraction of COGS
    pub waste_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EomResult {
    pub report: eom_report::Model,
    pub summary: EomSummary,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedUnit {
    pub dining_unit_id: i32,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EomBatch {
    pub month: u32,
    pub year: i32,
    pub reports: Vec<EomResult>,
    pub skipped: Vec<SkippedUnit>,
}

#[derive(Debug, Default, Clone, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EomFilter {
    pub dining_unit_id: Option<i32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// cogs = beginning + purchases + transfers in - transfers out - ending
pub fn compute_cogs(inputs: EomInputs) -> EomSummary {
    let beginning_inventory = money::round_cents(inputs.beginning_inventory);
    let purchases = money::round_cents(inputs.purchases);
    let transfers_in = money::round_cents(inputs.transfers_in);
    let transfers_out = money::round_cents(inputs.transfers_out);
    let ending_inventory = money::round_cents(inputs.ending_inventory);
    let waste = money::round_cents(inputs.waste);

    let cogs = money::round_cents(
        beginning_inventory + purchases + transfers_in - transfers_out - ending_inventory,
    );
    let plate_cost = (inputs.servings > 0.0).then(|| money::round_cents(cogs / inputs.servings));
    let waste_pct = (cogs > 0.0).then(|| waste / cogs);

    EomSummary {
        beginning_inventory,
        purchases,
        transfers_in,
        transfers_out,
        ending_inventory,
        waste,
        cogs,
        servings: inputs.servings,
        plate_cost,
        waste_pct,
    }
}

async fn logged_value<C: ConnectionTrait>(
    conn: &C,
    condition: Condition,
    month: u32,
    year: i32,
) -> Result<f64, DomainError> {
    let (start, end) = dates::month_bounds(month, year)?;
    let logs = InventoryLog::find()
        .filter(condition)
        .filter(inventory_log::Column::LogDate.gte(start))
        .filter(inventory_log::Column::LogDate.lt(end))
        .all(conn)
        .await?;
    Ok(money::round_cents(logs.iter().map(|l| l.value()).sum()))
}

async fn gather_inputs(
    db: &DatabaseConnection,
    unit_id: i32,
    month: u32,
    year: i32,
    warnings: &mut Vec<String>,
) -> Result<EomInputs, DomainError> {
    let ending = snapshot_service::find_snapshot(db, unit_id, month, year, SnapshotKind::Ending)
        .await?
        .ok_or_else(|| {
            DomainError::validation(format!(
                "no ending inventory snapshot for unit {} {}/{}",
                unit_id, month, year
            ))
        })?;

    let beginning = match snapshot_service::find_snapshot(
        db,
        unit_id,
        month,
        year,
        SnapshotKind::Beginning,
    )
    .await?
    {
        Some(snapshot) => snapshot.amount,
        None => {
            let (prev_month, prev_year) = dates::previous_period(month, year);
            match snapshot_service::find_snapshot(
                db,
                unit_id,
                prev_month,
                prev_year,
                SnapshotKind::Ending,
            )
            .await?
            {
                Some(previous) => previous.amount,
                None => {
                    let warning = format!(
                        "no beginning inventory for unit {} {}/{}; using 0.00",
                        unit_id, month, year
                    );
                    tracing::warn!("{}", warning);
                    warnings.push(warning);
                    0.0
                }
            }
        }
    };

    let transfer = InventoryAction::Transfer.as_str();
    let transfers_in = logged_value(
        db,
        Condition::all()
            .add(inventory_log::Column::Action.eq(transfer))
            .add(inventory_log::Column::TargetUnitId.eq(unit_id)),
        month,
        year,
    )
    .await?;
    let transfers_out = logged_value(
        db,
        Condition::all()
            .add(inventory_log::Column::Action.eq(transfer))
            .add(inventory_log::Column::DiningUnitId.eq(unit_id)),
        month,
        year,
    )
    .await?;
    let waste = logged_value(
        db,
        Condition::all()
            .add(inventory_log::Column::Action.eq(InventoryAction::Waste.as_str()))
            .add(inventory_log::Column::DiningUnitId.eq(unit_id)),
        month,
        year,
    )
    .await?;

    Ok(EomInputs {
        beginning_inventory: beginning,
        purchases: invoice_service::purchases_for_unit(db, unit_id, month, year).await?,
        transfers_in,
        transfers_out,
        ending_inventory: ending.amount,
        waste,
        servings: recipe_service::servings_for_unit(db, unit_id, month, year).await?,
    })
}

async fn save_report(
    db: &DatabaseConnection,
    unit_id: i32,
    month: u32,
    year: i32,
    summary: &EomSummary,
    generated_by: &str,
) -> Result<eom_report::Model, DomainError> {
    let existing = EomReport::find()
        .filter(eom_report::Column::DiningUnitId.eq(unit_id))
        .filter(eom_report::Column::Month.eq(month as i32))
        .filter(eom_report::Column::Year.eq(year))
        .one(db)
        .await?;

    let mut active = match existing {
        Some(report) => report.into(),
        None => eom_report::ActiveModel {
            dining_unit_id: Set(unit_id),
            month: Set(month as i32),
            year: Set(year),
            ..Default::default()
        },
    };
    active.beginning_inventory = Set(summary.beginning_inventory);
    active.purchases = Set(summary.purchases);
    active.transfers_in = Set(summary.transfers_in);
    active.transfers_out = Set(summary.transfers_out);
    active.ending_inventory = Set(summary.ending_inventory);
    active.waste = Set(summary.waste);
    active.cogs = Set(summary.cogs);
    active.servings = Set(summary.servings);
    active.plate_cost = Set(summary.plate_cost);
    active.generated_by = Set(generated_by.to_owned());
    active.generated_at = Set(dates::now_rfc3339());

    Ok(active.save(db).await?.try_into_model()?)
}

async fn run_for_unit(
    db: &DatabaseConnection,
    actor: &Actor,
    unit_id: i32,
    month: u32,
    year: i32,
) -> Result<EomResult, DomainError> {
    let mut warnings = Vec::new();
    let inputs = gather_inputs(db, unit_id, month, year, &mut warnings).await?;
    let summary = compute_cogs(inputs);
    let report = save_report(db, unit_id, month, year, &summary, &actor.username).await?;

    tracing::info!(
        "EOM {}/{} unit {}: cogs {:.2}, plate cost {:?}",
        month,
        year,
        unit_id,
        summary.cogs,
        summary.plate_cost
    );
    Ok(EomResult {
        report,
        summary,
        warnings,
    })
}

/// Compute and persist the EOM report for one unit
pub async fn run_eom(
    db: &DatabaseConnection,
    actor: &Actor,
    unit_id: i32,
    month: u32,
    year: i32,
) -> Result<EomResult, DomainError> {
    actor.ensure_role(&[Role::Admin, Role::Accounting, Role::Manager])?;
    actor.ensure_unit(unit_id)?;
    dates::validate_period(month, year)?;

    DiningUnit::find_by_id(unit_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Dining unit"))?;

    run_for_unit(db, actor, unit_id, month, year).await
}

/// Run EOM for every active unit; units missing an ending snapshot are skipped
pub async fn run_eom_all_units(
    db: &DatabaseConnection,
    actor: &Actor,
    month: u32,
    year: i32,
) -> Result<EomBatch, DomainError> {
    actor.ensure_role(&[Role::Admin, Role::Accounting])?;
    dates::validate_period(month, year)?;

    let units = DiningUnit::find()
        .filter(dining_unit::Column::IsActive.eq(true))
        .order_by_asc(dining_unit::Column::Name)
        .all(db)
        .await?;

    let mut batch = EomBatch {
        month,
        year,
        reports: Vec::with_capacity(units.len()),
        skipped: Vec::new(),
    };

    for unit in units {
        let has_ending =
            snapshot_service::find_snapshot(db, unit.id, month, year, SnapshotKind::Ending)
                .await?
                .is_some();
        if !has_ending {
            batch.skipped.push(SkippedUnit {
                dining_unit_id: unit.id,
                name: unit.name,
                reason: "no ending inventory snapshot".to_string(),
            });
            continue;
        }
        batch
            .reports
            .push(run_for_unit(db, actor, unit.id, month, year).await?);
    }

    tracing::info!(
        "EOM {}/{}: {} reports, {} units skipped",
        month,
        year,
        batch.reports.len(),
        batch.skipped.len()
    );
    Ok(batch)
}

pub async fn list_eom_reports(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: EomFilter,
) -> Result<Vec<eom_report::Model>, DomainError> {
    let mut query = EomReport::find();

    if let Some(unit_id) = actor.unit_filter(filter.dining_unit_id)? {
        query = query.filter(eom_report::Column::DiningUnitId.eq(unit_id));
    }
    if let Some(month) = filter.month {
        query = query.filter(eom_report::Column::Month.eq(month as i32));
    }
    if let Some(year) = filter.year {
        query = query.filter(eom_report::Column::Year.eq(year));
    }

    Ok(query
        .order_by_desc(eom_report::Column::Year)
        .order_by_desc(eom_report::Column::Month)
        .order_by_asc(eom_report::Column::DiningUnitId)
        .all(db)
        .await?)
}
