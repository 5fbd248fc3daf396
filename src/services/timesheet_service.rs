//! Timesheet Service - temporary agency labor
//!
//! Units submit hours worked by agency staff; the unit manager approves or
//! rejects them and approved entries feed the labor cost summary.

use std::collections::BTreeMap;

use sea_orm::*;
use serde::Serialize;

use crate::domain::{Actor, DomainError, Role, TimeEntryStatus};
use crate::models::temp_agency::{self, Entity as TempAgency};
use crate::models::temp_time_entry::{self, Entity as TempTimeEntry};
use crate::services::unit_service::require_active_unit;
use crate::utils::{dates, money};

#[derive(Debug, Clone, serde::Deserialize, utoipa::ToSchema)]
pub struct NewAgency {
    pub name: String,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize, utoipa::ToSchema)]
pub struct NewTimeEntry {
    pub unit_id: i32,
    pub agency_id: i32,
    pub worker_name: String,
    pub work_date: Option<String>,
    pub hours_worked: f64,
    pub hourly_rate: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Clone, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimeEntryFilter {
    pub unit_id: Option<i32>,
    pub agency_id: Option<i32>,
    pub status: Option<TimeEntryStatus>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Time entry with its agency name resolved
#[derive(Debug, Clone, Serialize)]
pub struct TimeEntryDto {
    #[serde(flatten)]
    pub entry: temp_time_entry::Model,
    pub agency_name: Option<String>,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, utoipa::ToSchema)]
pub struct AgencyLabor {
    pub agency_id: i32,
    pub agency_name: String,
    pub entries: usize,
    pub hours: f64,
    pub cost: f64,
}

pub async fn list_agencies(
    db: &DatabaseConnection,
    include_inactive: bool,
) -> Result<Vec<temp_agency::Model>, DomainError> {
    let mut query = TempAgency::find();
    if !include_inactive {
        query = query.filter(temp_agency::Column::IsActive.eq(true));
    }
    Ok(query.order_by_asc(temp_agency::Column::Name).all(db).await?)
}

pub async fn create_agency(
    db: &DatabaseConnection,
    actor: &Actor,
    input: NewAgency,
) -> Result<temp_agency::Model, DomainError> {
    actor.ensure_role(&[Role::Admin, Role::Accounting])?;

    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::validation("agency name is required"));
    }

    let now = dates::now_rfc3339();
    let agency = temp_agency::ActiveModel {
        name: Set(name),
        contact_email: Set(input.contact_email.filter(|e| !e.trim().is_empty())),
        is_active: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("{} added temp agency '{}'", actor.username, agency.name);
    Ok(agency)
}

fn validate_entry(input: &NewTimeEntry) -> Result<String, DomainError> {
    let worker_name = input.worker_name.trim().to_string();
    if worker_name.is_empty() {
        return Err(DomainError::validation("worker_name is required"));
    }
    if !input.hours_worked.is_finite() || input.hours_worked <= 0.0 || input.hours_worked > 24.0 {
        return Err(DomainError::validation(
            "hours_worked must be greater than 0 and at most 24",
        ));
    }
    if !input.hourly_rate.is_finite() || input.hourly_rate <= 0.0 {
        return Err(DomainError::validation("hourly_rate must be greater than zero"));
    }
    Ok(worker_name)
}

fn to_dto(entry: temp_time_entry::Model, agency: Option<temp_agency::Model>) -> TimeEntryDto {
    TimeEntryDto {
        cost: money::round_cents(entry.cost()),
        agency_name: agency.map(|a| a.name),
        entry,
    }
}

pub async fn submit_entry(
    db: &DatabaseConnection,
    actor: &Actor,
    input: NewTimeEntry,
) -> Result<TimeEntryDto, DomainError> {
    actor.ensure_unit(input.unit_id)?;
    let worker_name = validate_entry(&input)?;
    let work_date = dates::date_or_today(input.work_date.as_deref())?;
    require_active_unit(db, input.unit_id).await?;

    let agency = TempAgency::find_by_id(input.agency_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Agency"))?;
    if !agency.is_active {
        return Err(DomainError::InvalidState(format!(
            "agency '{}' is inactive",
            agency.name
        )));
    }

    let now = dates::now_rfc3339();
    let entry = temp_time_entry::ActiveModel {
        unit_id: Set(input.unit_id),
        agency_id: Set(agency.id),
        worker_name: Set(worker_name),
        work_date: Set(work_date),
        hours_worked: Set(input.hours_worked),
        hourly_rate: Set(input.hourly_rate),
        status: Set(TimeEntryStatus::Pending.as_str().to_owned()),
        submitted_by: Set(actor.username.clone()),
        reviewed_by: Set(None),
        reviewed_at: Set(None),
        notes: Set(input.notes),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        "{} submitted {}h for {} ({})",
        actor.username,
        entry.hours_worked,
        entry.worker_name,
        agency.name
    );
    Ok(to_dto(entry, Some(agency)))
}

fn entry_condition(actor: &Actor, filter: &TimeEntryFilter) -> Result<Condition, DomainError> {
    let mut condition = Condition::all();

    if let Some(unit_id) = actor.unit_filter(filter.unit_id)? {
        condition = condition.add(temp_time_entry::Column::UnitId.eq(unit_id));
    }
    if let Some(agency_id) = filter.agency_id {
        condition = condition.add(temp_time_entry::Column::AgencyId.eq(agency_id));
    }
    if let Some(status) = filter.status {
        condition = condition.add(temp_time_entry::Column::Status.eq(status.as_str()));
    }
    if let Some(from) = &filter.from_date {
        condition = condition.add(temp_time_entry::Column::WorkDate.gte(dates::parse_date(from)?));
    }
    if let Some(to) = &filter.to_date {
        condition = condition.add(temp_time_entry::Column::WorkDate.lte(dates::parse_date(to)?));
    }
    Ok(condition)
}

pub async fn list_entries(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: TimeEntryFilter,
) -> Result<Vec<TimeEntryDto>, DomainError> {
    let rows = TempTimeEntry::find()
        .filter(entry_condition(actor, &filter)?)
        .find_also_related(TempAgency)
        .order_by_desc(temp_time_entry::Column::WorkDate)
        .order_by_desc(temp_time_entry::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(entry, agency)| to_dto(entry, agency))
        .collect())
}

/// Approve or reject a pending entry
pub async fn review_entry(
    db: &DatabaseConnection,
    actor: &Actor,
    id: i32,
    decision: ReviewDecision,
) -> Result<TimeEntryDto, DomainError> {
    actor.ensure_role(&[Role::Admin, Role::Manager])?;

    let entry = TempTimeEntry::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Time entry"))?;
    actor.ensure_unit(entry.unit_id)?;

    if entry.status != TimeEntryStatus::Pending.as_str() {
        return Err(DomainError::InvalidState(format!(
            "time entry is already {}",
            entry.status
        )));
    }

    let status = match decision {
        ReviewDecision::Approve => TimeEntryStatus::Approved,
        ReviewDecision::Reject => TimeEntryStatus::Rejected,
    };
    let now = dates::now_rfc3339();
    let mut active: temp_time_entry::ActiveModel = entry.into();
    active.status = Set(status.as_str().to_owned());
    active.reviewed_by = Set(Some(actor.username.clone()));
    active.reviewed_at = Set(Some(now.clone()));
    active.updated_at = Set(now);

    let updated = active.update(db).await?;
    let agency = TempAgency::find_by_id(updated.agency_id).one(db).await?;

    tracing::info!("{} marked time entry {} {}", actor.username, updated.id, status);
    Ok(to_dto(updated, agency))
}

/// Approved hours and cost per agency
pub async fn labor_summary(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: TimeEntryFilter,
) -> Result<Vec<AgencyLabor>, DomainError> {
    let filter = TimeEntryFilter {
        status: Some(TimeEntryStatus::Approved),
        ..filter
    };
    let rows = TempTimeEntry::find()
        .filter(entry_condition(actor, &filter)?)
        .find_also_related(TempAgency)
        .all(db)
        .await?;

    Ok(summarize(rows))
}

fn summarize(rows: Vec<(temp_time_entry::Model, Option<temp_agency::Model>)>) -> Vec<AgencyLabor> {
    let mut by_agency: BTreeMap<i32, AgencyLabor> = BTreeMap::new();
    for (entry, agency) in rows {
        let line = by_agency.entry(entry.agency_id).or_insert_with(|| AgencyLabor {
            agency_id: entry.agency_id,
            agency_name: agency.map(|a| a.name).unwrap_or_default(),
            entries: 0,
            hours: 0.0,
            cost: 0.0,
        });
        line.entries += 1;
        line.hours += entry.hours_worked;
        line.cost += entry.cost();
    }

    let mut summary: Vec<AgencyLabor> = by_agency
        .into_values()
        .map(|line| AgencyLabor {
            cost: money::round_cents(line.cost),
            ..line
        })
        .collect();
    summary.sort_by(|a, b| a.agency_name.cmp(&b.agency_name));
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(agency_id: i32, hours: f64, rate: f64) -> temp_time_entry::Model {
        temp_time_entry::Model {
            id: 0,
            unit_id: 1,
            agency_id,
            worker_name: "Pat".to_string(),
            work_date: "2026-09-14".to_string(),
            hours_worked: hours,
            hourly_rate: rate,
            status: "Approved".to_string(),
            submitted_by: "cook".to_string(),
            reviewed_by: None,
            reviewed_at: None,
            notes: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn agency(id: i32, name: &str) -> Option<temp_agency::Model> {
        Some(temp_agency::Model {
            id,
            name: name.to_string(),
            contact_email: None,
            is_active: true,
            created_at: String::new(),
            updated_at: String::new(),
        })
    }

    #[test]
    fn summary_groups_by_agency() {
        let summary = summarize(vec![
            (entry(2, 8.0, 16.5), agency(2, "Staffmark")),
            (entry(1, 6.0, 15.0), agency(1, "Kelly Services")),
            (entry(2, 4.0, 16.5), agency(2, "Staffmark")),
        ]);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].agency_name, "Kelly Services");
        assert_eq!(summary[0].cost, 90.0);
        assert_eq!(summary[1].entries, 2);
        assert_eq!(summary[1].hours, 12.0);
        assert_eq!(summary[1].cost, 198.0);
    }

    #[test]
    fn hours_must_fit_in_a_day() {
        let mut input = NewTimeEntry {
            unit_id: 1,
            agency_id: 1,
            worker_name: " Pat ".to_string(),
            work_date: None,
            hours_worked: 8.0,
            hourly_rate: 15.0,
            notes: None,
        };
        assert_eq!(validate_entry(&input).unwrap(), "Pat");
        input.hours_worked = 24.5;
        assert!(validate_entry(&input).is_err());
        input.hours_worked = 0.0;
        assert!(validate_entry(&input).is_err());
    }
}
