//! Unit Service - dining unit registry

use sea_orm::*;

use crate::domain::{Actor, DiningUnit, DiningUnitRepository, DomainError, Role, Scope};
use crate::models::dining_unit::{self, Entity as DiningUnitEntity};

/// Load a unit row, `NotFound` when the id is unknown
pub(crate) async fn require_unit<C: ConnectionTrait>(
    conn: &C,
    unit_id: i32,
) -> Result<dining_unit::Model, DomainError> {
    DiningUnitEntity::find_by_id(unit_id)
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Dining unit {}", unit_id)))
}

/// New activity can only be booked against active units
pub(crate) async fn require_active_unit<C: ConnectionTrait>(
    conn: &C,
    unit_id: i32,
) -> Result<dining_unit::Model, DomainError> {
    let unit = require_unit(conn, unit_id).await?;
    if !unit.is_active {
        return Err(DomainError::InvalidState(format!(
            "Dining unit {} is inactive",
            unit_id
        )));
    }
    Ok(unit)
}

/// Units the actor can see; inactive ones only on request
pub async fn list_units(
    repo: &dyn DiningUnitRepository,
    actor: &Actor,
    include_inactive: bool,
) -> Result<Vec<DiningUnit>, DomainError> {
    let units = repo.find_all(include_inactive).await?;
    Ok(match actor.scope() {
        Scope::AllUnits => units,
        Scope::Unit(own) => units.into_iter().filter(|u| u.id == own).collect(),
        Scope::NoUnits => Vec::new(),
    })
}

pub async fn create_unit(
    repo: &dyn DiningUnitRepository,
    actor: &Actor,
    name: &str,
    code: &str,
) -> Result<DiningUnit, DomainError> {
    actor.ensure_role(&[Role::Admin])?;

    let name = name.trim();
    let code = code.trim().to_ascii_uppercase();
    if name.is_empty() {
        return Err(DomainError::validation("unit name is required"));
    }
    if code.is_empty() {
        return Err(DomainError::validation("unit code is required"));
    }

    let unit = repo.create(name.to_string(), code).await?;
    tracing::info!("{} created dining unit {} ({})", actor.username, unit.name, unit.code);
    Ok(unit)
}

/// Stop a unit from appearing in lists and EOM runs; its history stays
pub async fn deactivate_unit(
    repo: &dyn DiningUnitRepository,
    actor: &Actor,
    id: i32,
) -> Result<DiningUnit, DomainError> {
    actor.ensure_role(&[Role::Admin])?;
    let unit = repo.set_active(id, false).await?;
    tracing::info!("{} deactivated dining unit {}", actor.username, unit.name);
    Ok(unit)
}
