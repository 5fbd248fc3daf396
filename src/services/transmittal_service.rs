//! Transmittal Service - cash deposits sent from unit registers to the cashier

use sea_orm::*;

use crate::domain::{Actor, DomainError, Role, TransmittalStatus};
use crate::models::deposit_transmittal::{self, Entity as DepositTransmittal};
use crate::services::unit_service::require_active_unit;
use crate::utils::{dates, money};

#[derive(Debug, Clone, serde::Deserialize, utoipa::ToSchema)]
pub struct NewTransmittal {
    pub dining_unit_id: i32,
    pub deposit_date: Option<String>,
    #[serde(default)]
    pub currency_amount: f64,
    #[serde(default)]
    pub coin_amount: f64,
    #[serde(default)]
    pub check_amount: f64,
    pub bag_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Clone, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransmittalFilter {
    pub dining_unit_id: Option<i32>,
    pub status: Option<TransmittalStatus>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

fn deposit_total(input: &NewTransmittal) -> Result<f64, DomainError> {
    for (field, value) in [
        ("currency_amount", input.currency_amount),
        ("coin_amount", input.coin_amount),
        ("check_amount", input.check_amount),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(DomainError::validation(format!(
                "{} cannot be negative",
                field
            )));
        }
    }

    let total = money::round_cents(input.currency_amount + input.coin_amount + input.check_amount);
    if total <= 0.0 {
        return Err(DomainError::validation("deposit total must be greater than zero"));
    }
    Ok(total)
}

fn reference_for(deposit_date: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("DT-{}-{}", deposit_date.replace('-', ""), &id[..8])
}

/// Record a deposit prepared by a unit
pub async fn create_transmittal(
    db: &DatabaseConnection,
    actor: &Actor,
    input: NewTransmittal,
) -> Result<deposit_transmittal::Model, DomainError> {
    actor.ensure_unit(input.dining_unit_id)?;
    let total = deposit_total(&input)?;
    let deposit_date = dates::date_or_today(input.deposit_date.as_deref())?;
    require_active_unit(db, input.dining_unit_id).await?;

    let now = dates::now_rfc3339();
    let transmittal = deposit_transmittal::ActiveModel {
        reference: Set(reference_for(&deposit_date)),
        dining_unit_id: Set(input.dining_unit_id),
        deposit_date: Set(deposit_date),
        currency_amount: Set(money::round_cents(input.currency_amount)),
        coin_amount: Set(money::round_cents(input.coin_amount)),
        check_amount: Set(money::round_cents(input.check_amount)),
        total_amount: Set(total),
        bag_number: Set(input.bag_number.filter(|b| !b.trim().is_empty())),
        prepared_by: Set(actor.username.clone()),
        status: Set(TransmittalStatus::Submitted.as_str().to_owned()),
        verified_by: Set(None),
        verified_at: Set(None),
        notes: Set(input.notes),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = transmittal.insert(db).await?;
    tracing::info!(
        "{} submitted deposit {} for {:.2}",
        actor.username,
        saved.reference,
        saved.total_amount
    );
    Ok(saved)
}

pub async fn list_transmittals(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: TransmittalFilter,
) -> Result<Vec<deposit_transmittal::Model>, DomainError> {
    let mut condition = Condition::all();

    if let Some(unit_id) = actor.unit_filter(filter.dining_unit_id)? {
        condition = condition.add(deposit_transmittal::Column::DiningUnitId.eq(unit_id));
    }
    if let Some(status) = filter.status {
        condition = condition.add(deposit_transmittal::Column::Status.eq(status.as_str()));
    }
    if let Some(from) = filter.from_date {
        condition =
            condition.add(deposit_transmittal::Column::DepositDate.gte(dates::parse_date(&from)?));
    }
    if let Some(to) = filter.to_date {
        condition =
            condition.add(deposit_transmittal::Column::DepositDate.lte(dates::parse_date(&to)?));
    }

    Ok(DepositTransmittal::find()
        .filter(condition)
        .order_by_desc(deposit_transmittal::Column::DepositDate)
        .order_by_desc(deposit_transmittal::Column::Id)
        .all(db)
        .await?)
}

pub async fn get_transmittal(
    db: &DatabaseConnection,
    actor: &Actor,
    id: i32,
) -> Result<deposit_transmittal::Model, DomainError> {
    let transmittal = DepositTransmittal::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Transmittal"))?;
    actor.ensure_unit(transmittal.dining_unit_id)?;
    Ok(transmittal)
}

/// Cashier confirms the deposit was received intact
pub async fn verify_transmittal(
    db: &DatabaseConnection,
    actor: &Actor,
    id: i32,
) -> Result<deposit_transmittal::Model, DomainError> {
    actor.ensure_role(&[Role::Admin, Role::Accounting])?;

    let transmittal = DepositTransmittal::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Transmittal"))?;

    if transmittal.status == TransmittalStatus::Verified.as_str() {
        return Err(DomainError::InvalidState(
            "Transmittal is already verified".to_string(),
        ));
    }

    let now = dates::now_rfc3339();
    let mut active: deposit_transmittal::ActiveModel = transmittal.into();
    active.status = Set(TransmittalStatus::Verified.as_str().to_owned());
    active.verified_by = Set(Some(actor.username.clone()));
    active.verified_at = Set(Some(now.clone()));
    active.updated_at = Set(now);

    let updated = active.update(db).await?;
    tracing::info!("{} verified deposit {}", actor.username, updated.reference);
    Ok(updated)
}
