//! Export Service - CSV renderings of the operational tables
//!
//! Every export reuses the scoped list operation of its module, so a caller
//! only ever downloads rows they could already list.

use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::domain::{Actor, DomainError};
use crate::services::eom_service::{self, EomFilter};
use crate::services::inventory_service::{self, ItemFilter, LogFilter};
use crate::services::invoice_service::{self, InvoiceFilter};
use crate::services::timesheet_service::{self, TimeEntryFilter};
use crate::utils::money;

/// Finished CSV document
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub content: Vec<u8>,
}

fn write_csv<T: Serialize>(name: &str, rows: &[T]) -> Result<CsvExport, DomainError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| DomainError::Internal(format!("CSV write failed: {}", e)))?;
    }
    let content = writer
        .into_inner()
        .map_err(|e| DomainError::Internal(format!("CSV flush failed: {}", e)))?;

    Ok(CsvExport {
        filename: format!("{}_{}.csv", name, chrono::Utc::now().format("%Y-%m-%d")),
        content,
    })
}

#[derive(Serialize)]
struct InventoryRow<'a> {
    dining_unit_id: i32,
    sku: &'a str,
    name: &'a str,
    category: &'a str,
    uom: &'a str,
    qty_on_hand: f64,
    unit_price: f64,
    extended_value: f64,
    reorder_level: f64,
    low_stock: bool,
}

pub async fn inventory_csv(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: ItemFilter,
) -> Result<CsvExport, DomainError> {
    let items = inventory_service::list_items(db, actor, filter).await?;
    let rows: Vec<InventoryRow> = items
        .iter()
        .map(|i| InventoryRow {
            dining_unit_id: i.dining_unit_id,
            sku: &i.sku,
            name: &i.name,
            category: i.category.as_deref().unwrap_or(""),
            uom: &i.uom,
            qty_on_hand: i.qty_on_hand,
            unit_price: i.unit_price,
            extended_value: money::round_cents(i.extended_value()),
            reorder_level: i.reorder_level,
            low_stock: i.is_low_stock(),
        })
        .collect();
    write_csv("inventory", &rows)
}

#[derive(Serialize)]
struct LogRow<'a> {
    log_date: &'a str,
    dining_unit_id: i32,
    action: &'a str,
    sku: &'a str,
    item_name: &'a str,
    quantity: f64,
    unit_price: f64,
    value: f64,
    target_unit_id: Option<i32>,
    performed_by: &'a str,
    notes: &'a str,
}

pub async fn inventory_logs_csv(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: LogFilter,
) -> Result<CsvExport, DomainError> {
    let logs = inventory_service::list_logs(db, actor, filter).await?;
    let rows: Vec<LogRow> = logs
        .iter()
        .map(|l| LogRow {
            log_date: &l.log_date,
            dining_unit_id: l.dining_unit_id,
            action: &l.action,
            sku: &l.sku,
            item_name: &l.item_name,
            quantity: l.quantity,
            unit_price: l.unit_price,
            value: money::round_cents(l.value()),
            target_unit_id: l.target_unit_id,
            performed_by: &l.performed_by,
            notes: l.notes.as_deref().unwrap_or(""),
        })
        .collect();
    write_csv("inventory_logs", &rows)
}

/// One row per allocation line, the shape accounts payable keys from
#[derive(Serialize)]
struct InvoiceRow<'a> {
    invoice_id: i32,
    vendor: &'a str,
    invoice_number: &'a str,
    invoice_date: &'a str,
    invoice_total: f64,
    status: &'a str,
    submitted_by: &'a str,
    allocated_unit_id: i32,
    gl_code: &'a str,
    allocated_amount: f64,
}

pub async fn invoices_csv(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: InvoiceFilter,
) -> Result<CsvExport, DomainError> {
    let invoices = invoice_service::list_invoices(db, actor, filter).await?;
    let rows: Vec<InvoiceRow> = invoices
        .iter()
        .flat_map(|invoice| {
            invoice.allocations.iter().map(move |a| InvoiceRow {
                invoice_id: invoice.id,
                vendor: &invoice.vendor,
                invoice_number: &invoice.invoice_number,
                invoice_date: &invoice.invoice_date,
                invoice_total: invoice.invoice_total,
                status: &invoice.status,
                submitted_by: &invoice.submitted_by,
                allocated_unit_id: a.dining_unit_id,
                gl_code: a.gl_code.as_deref().unwrap_or(""),
                allocated_amount: a.amount,
            })
        })
        .collect();
    write_csv("invoices", &rows)
}

#[derive(Serialize)]
struct TimesheetRow<'a> {
    work_date: &'a str,
    unit_id: i32,
    agency: &'a str,
    worker_name: &'a str,
    hours_worked: f64,
    hourly_rate: f64,
    cost: f64,
    status: &'a str,
    submitted_by: &'a str,
    reviewed_by: &'a str,
}

pub async fn timesheets_csv(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: TimeEntryFilter,
) -> Result<CsvExport, DomainError> {
    let entries = timesheet_service::list_entries(db, actor, filter).await?;
    let rows: Vec<TimesheetRow> = entries
        .iter()
        .map(|dto| TimesheetRow {
            work_date: &dto.entry.work_date,
            unit_id: dto.entry.unit_id,
            agency: dto.agency_name.as_deref().unwrap_or(""),
            worker_name: &dto.entry.worker_name,
            hours_worked: dto.entry.hours_worked,
            hourly_rate: dto.entry.hourly_rate,
            cost: dto.cost,
            status: &dto.entry.status,
            submitted_by: &dto.entry.submitted_by,
            reviewed_by: dto.entry.reviewed_by.as_deref().unwrap_or(""),
        })
        .collect();
    write_csv("temp_labor", &rows)
}

#[derive(Serialize)]
struct EomRow {
    dining_unit_id: i32,
    month: i32,
    year: i32,
    beginning_inventory: f64,
    purchases: f64,
    transfers_in: f64,
    transfers_out: f64,
    ending_inventory: f64,
    waste: f64,
    cogs: f64,
    servings: f64,
    plate_cost: Option<f64>,
}

pub async fn eom_csv(
    db: &DatabaseConnection,
    actor: &Actor,
    filter: EomFilter,
) -> Result<CsvExport, DomainError> {
    let reports = eom_service::list_eom_reports(db, actor, filter).await?;
    let rows: Vec<EomRow> = reports
        .into_iter()
        .map(|r| EomRow {
            dining_unit_id: r.dining_unit_id,
            month: r.month,
            year: r.year,
            beginning_inventory: r.beginning_inventory,
            purchases: r.purchases,
            transfers_in: r.transfers_in,
            transfers_out: r.transfers_out,
            ending_inventory: r.ending_inventory,
            waste: r.waste,
            cogs: r.cogs,
            servings: r.servings,
            plate_cost: r.plate_cost,
        })
        .collect();
    write_csv("eom_reports", &rows)
}
