//! Invoice Service - vendor invoice submission and processing

use sea_orm::*;

use crate::domain::{Actor, DomainError, InvoiceStatus, Role};
use crate::models::invoice_log::{self, Allocation, Entity as InvoiceLog, InvoiceDto};
use crate::services::unit_service::require_active_unit;
use crate::utils::{dates, money};

/// Request for submitting an invoice
#[derive(Debug, Clone, serde::Deserialize, utoipa::ToSchema)]
pub struct SubmitInvoice {
    pub vendor: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub invoice_total: f64,
    /// Empty means "charge everything to the submitting unit"
    #[serde(default)]
    pub allocations: Vec<Allocation>,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub dining_unit_id: i32,
    pub notes: Option<String>,
}

/// Filter parameters for listing invoices
#[derive(Debug, Default, Clone, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvoiceFilter {
    /// Matches the submitting unit or any allocated unit
    pub dining_unit_id: Option<i32>,
    pub status: Option<InvoiceStatus>,
    pub vendor: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

/// Check allocations against the invoice total, defaulting to a single
/// allocation for the submitting unit.
pub fn normalize_allocations(
    total: f64,
    submitting_unit: i32,
    allocations: Vec<Allocation>,
) -> Result<Vec<Allocation>, DomainError> {
    if !total.is_finite() || total <= 0.0 {
        return Err(DomainError::validation(
            "invoice_total must be greater than zero",
        ));
    }

    if allocations.is_empty() {
        return Ok(vec![Allocation {
            dining_unit_id: submitting_unit,
            gl_code: None,
            amount: money::round_cents(total),
        }]);
    }

    let mut normalized = Vec::with_capacity(allocations.len());
    for allocation in allocations {
        if !allocation.amount.is_finite() || allocation.amount <= 0.0 {
            return Err(DomainError::validation(format!(
                "allocation to unit {} must be greater than zero",
                allocation.dining_unit_id
            )));
        }
        normalized.push(Allocation {
            dining_unit_id: allocation.dining_unit_id,
            gl_code: allocation.gl_code.filter(|g| !g.trim().is_empty()),
            amount: money::round_cents(allocation.amount),
        });
    }

    let allocated: f64 = normalized.iter().map(|a| a.amount).sum();
    if (allocated - total).abs() > 0.01 + 1e-9 {
        return Err(DomainError::validation(format!(
            "allocations total {:.2} but invoice total is {:.2}",
            allocated, total
        )));
    }

    Ok(normalized)
}

fn to_dto(model: invoice_log::Model) -> Result<InvoiceDto, DomainError> {
    Ok(InvoiceDto::try_from(model)?)
}

/// An invoice is visible to the submitting unit and to every allocated unit
fn visible_to(actor: &Actor, model: &invoice_log::Model) -> Result<bool, DomainError> {
    if actor.can_access(model.dining_unit_id) {
        return Ok(true);
    }
    Ok(model
        .allocation_list()?
        .iter()
        .any(|a| actor.can_access(a.dining_unit_id)))
}

async fn find_visible(
    db: &DatabaseConnection,
    actor: &Actor,
    id: i32,
) -> Result<invoice_log::Model, DomainError> {
    let invoice = InvoiceLog::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Invoice"))?;
    if !visible_to(actor, &invoice)? {
        return Err(DomainError::Forbidden(format!(
            "{} has no access to invoice {}",
            actor.username, id
        )));
    }
    Ok(invoice)
}

/// Submit a new invoice
pub async fn submit_invoice(
    db: &DatabaseConnection,
    actor: &Actor,
    request: SubmitInvoice,
) -> Result<InvoiceDto, DomainError> {
    actor.ensure_unit(request.dining_unit_id)?;

    let vendor = request.vendor.trim().to_string();
    let invoice_number = request.invoice_number.trim().to_string();
    if vendor.is_empty() {
        return Err(DomainError::validation("vendor is required"));
    }
    if invoice_number.is_empty() {
        return Err(DomainError::validation("invoice_number is required"));
    }
    let invoice_date = dates::parse_date(&request.invoice_date)?;
    let allocations = normalize_allocations(
        request.invoice_total,
        request.dining_unit_id,
        request.allocations,
    )?;
    require_active_unit(db, request.dining_unit_id).await?;
    // Charging another unit needs the same scope as submitting for it
    for allocation in &allocations {
        actor.ensure_unit(allocation.dining_unit_id)?;
        if allocation.dining_unit_id != request.dining_unit_id {
            require_active_unit(db, allocation.dining_unit_id).await?;
        }
    }
    let attachments: Vec<String> = request
        .attachments
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();

    let now = dates::now_rfc3339();
    let new_invoice = invoice_log::ActiveModel {
        vendor: Set(vendor),
        invoice_number: Set(invoice_number),
        invoice_date: Set(invoice_date),
        invoice_total: Set(money::round_cents(request.invoice_total)),
        allocations: Set(serde_json::to_string(&allocations)?),
        status: Set(InvoiceStatus::Submitted.as_str().to_owned()),
        attachments: Set(serde_json::to_string(&attachments)?),
        dining_unit_id: Set(request.dining_unit_id),
        submitted_by: Set(actor.username.clone()),
        processed_by: Set(None),
        processed_at: Set(None),
        notes: Set(request.notes),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = new_invoice.insert(db).await.map_err(|e| match DomainError::from(e) {
        DomainError::Conflict(_) => {
            DomainError::Conflict("this vendor invoice number was already submitted".to_string())
        }
        other => other,
    })?;

    tracing::info!(
        "{} submitted invoice {} from {} for {:.2}",
        actor.username,
        saved.invoice_number,
        saved.vendor,
        saved.invoice_total
    );
    to_dto(saved)
}

/// List invoices, newest invoice date first
pub async fn list_invoices(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: InvoiceFilter,
) -> Result<Vec<InvoiceDto>, DomainError> {
    let unit = actor.unit_filter(filter.dining_unit_id)?;
    let mut condition = Condition::all();

    if let Some(status) = filter.status {
        condition = condition.add(invoice_log::Column::Status.eq(status.as_str()));
    }
    if let Some(vendor) = filter.vendor
        && !vendor.is_empty()
    {
        condition = condition.add(invoice_log::Column::Vendor.contains(&vendor));
    }
    if let Some(from) = filter.from_date {
        condition = condition.add(invoice_log::Column::InvoiceDate.gte(dates::parse_date(&from)?));
    }
    if let Some(to) = filter.to_date {
        condition = condition.add(invoice_log::Column::InvoiceDate.lte(dates::parse_date(&to)?));
    }

    let invoices = InvoiceLog::find()
        .filter(condition)
        .order_by_desc(invoice_log::Column::InvoiceDate)
        .order_by_desc(invoice_log::Column::Id)
        .all(db)
        .await?;

    // Allocations live in a JSON column, so the unit filter runs here
    let mut result = Vec::with_capacity(invoices.len());
    for invoice in invoices {
        if let Some(unit_id) = unit {
            let touches_unit = invoice.dining_unit_id == unit_id
                || invoice
                    .allocation_list()?
                    .iter()
                    .any(|a| a.dining_unit_id == unit_id);
            if !touches_unit {
                continue;
            }
        }
        result.push(to_dto(invoice)?);
    }

    Ok(result)
}

pub async fn get_invoice(
    db: &DatabaseConnection,
    actor: &Actor,
    id: i32,
) -> Result<InvoiceDto, DomainError> {
    to_dto(find_visible(db, actor, id).await?)
}

/// Mark an invoice as processed by accounts payable
pub async fn process_invoice(
    db: &DatabaseConnection,
    actor: &Actor,
    id: i32,
) -> Result<InvoiceDto, DomainError> {
    actor.ensure_role(&[Role::Admin, Role::Accounting])?;

    let invoice = InvoiceLog::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Invoice"))?;

    if invoice.status == InvoiceStatus::Processed.as_str() {
        return Err(DomainError::InvalidState(
            "Invoice is already processed".to_string(),
        ));
    }

    let now = dates::now_rfc3339();
    let mut active: invoice_log::ActiveModel = invoice.into();
    active.status = Set(InvoiceStatus::Processed.as_str().to_owned());
    active.processed_by = Set(Some(actor.username.clone()));
    active.processed_at = Set(Some(now.clone()));
    active.updated_at = Set(now);

    let updated = active.update(db).await?;
    tracing::info!("{} processed invoice {}", actor.username, updated.id);
    to_dto(updated)
}

/// Append a storage reference (path or URL) to an invoice
pub async fn add_attachment(
    db: &DatabaseConnection,
    actor: &Actor,
    id: i32,
    reference: &str,
) -> Result<InvoiceDto, DomainError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(DomainError::validation("attachment reference is required"));
    }

    let invoice = find_visible(db, actor, id).await?;
    let mut attachments = invoice.attachment_list()?;
    if !attachments.iter().any(|a| a == reference) {
        attachments.push(reference.to_string());
    }

    let mut active: invoice_log::ActiveModel = invoice.into();
    active.attachments = Set(serde_json::to_string(&attachments)?);
    active.updated_at = Set(dates::now_rfc3339());

    to_dto(active.update(db).await?)
}

/// Withdraw an invoice that accounting has not processed yet
pub async fn delete_invoice(
    db: &DatabaseConnection,
    actor: &Actor,
    id: i32,
) -> Result<(), DomainError> {
    let invoice = find_visible(db, actor, id).await?;
    actor.ensure_unit(invoice.dining_unit_id)?;

    if invoice.status != InvoiceStatus::Submitted.as_str() {
        return Err(DomainError::InvalidState(
            "Processed invoices cannot be deleted".to_string(),
        ));
    }

    InvoiceLog::delete_by_id(invoice.id).exec(db).await?;
    tracing::info!("{} deleted invoice {}", actor.username, invoice.id);
    Ok(())
}

/// Σ allocations charged to a unit by invoices dated in the month.
/// Submitted and processed invoices both count.
pub async fn purchases_for_unit<C: ConnectionTrait>(
    conn: &C,
    unit_id: i32,
    month: u32,
    year: i32,
) -> Result<f64, DomainError> {
    let (start, end) = dates::month_bounds(month, year)?;

    let invoices = InvoiceLog::find()
        .filter(invoice_log::Column::InvoiceDate.gte(start))
        .filter(invoice_log::Column::InvoiceDate.lt(end))
        .all(conn)
        .await?;

    let mut total = 0.0;
    for invoice in &invoices {
        total += invoice.allocated_to(unit_id)?;
    }
    Ok(money::round_cents(total))
}
