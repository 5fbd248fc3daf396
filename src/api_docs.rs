use crate::api;
use crate::domain::{
    DiningUnit, InventoryAction, InvoiceStatus, Recipe, RecipeInput, RecipeItem, SnapshotKind,
    TimeEntryStatus, TransmittalStatus,
};
use crate::models::invoice_log::Allocation;
use crate::services::{
    eom_service, inventory_service, invoice_service, recipe_service, snapshot_service,
    timesheet_service, transmittal_service,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::auth::login,
        api::auth::create_user,
        api::auth::get_me,
        api::units::list_units,
        api::units::create_unit,
        api::units::deactivate_unit,
        api::inventory::list_items,
        api::inventory::create_item,
        api::inventory::get_item,
        api::inventory::edit_item,
        api::inventory::delete_item,
        api::inventory::lookup_sku,
        api::inventory::check_in,
        api::inventory::check_out,
        api::inventory::record_waste,
        api::inventory::transfer,
        api::inventory::low_stock,
        api::inventory::list_logs,
        api::inventory::inventory_value,
        api::invoices::list_invoices,
        api::invoices::submit_invoice,
        api::invoices::get_invoice,
        api::invoices::process_invoice,
        api::invoices::add_attachment,
        api::invoices::delete_invoice,
        api::invoices::list_transmittals,
        api::invoices::create_transmittal,
        api::invoices::get_transmittal,
        api::invoices::verify_transmittal,
        api::recipes::list_recipes,
        api::recipes::create_recipe,
        api::recipes::get_recipe,
        api::recipes::update_recipe,
        api::recipes::delete_recipe,
        api::recipes::cost_recipe,
        api::recipes::log_production,
        api::recipes::list_production,
        api::eom::list_snapshots,
        api::eom::save_snapshot,
        api::eom::run_eom,
        api::eom::list_reports,
        api::timesheets::list_agencies,
        api::timesheets::create_agency,
        api::timesheets::list_entries,
        api::timesheets::submit_entry,
        api::timesheets::review_entry,
        api::timesheets::labor_summary,
        api::export::export_inventory,
        api::export::export_inventory_logs,
        api::export::export_invoices,
        api::export::export_timesheets,
        api::export::export_eom,
    ),
    components(
        schemas(
            api::auth::LoginRequest,
            api::auth::CreateUserRequest,
            api::units::CreateUnitRequest,
            api::invoices::AttachmentRequest,
            api::eom::RunEomRequest,
            api::timesheets::ReviewRequest,
            DiningUnit,
            Recipe,
            RecipeInput,
            RecipeItem,
            Allocation,
            InventoryAction,
            InvoiceStatus,
            TransmittalStatus,
            SnapshotKind,
            TimeEntryStatus,
            inventory_service::NewItem,
            inventory_service::ItemChanges,
            inventory_service::Movement,
            inventory_service::TransferRequest,
            invoice_service::SubmitInvoice,
            transmittal_service::NewTransmittal,
            recipe_service::LogProduction,
            recipe_service::CostLine,
            recipe_service::ProductionPlan,
            snapshot_service::SnapshotRequest,
            eom_service::EomSummary,
            timesheet_service::NewAgency,
            timesheet_service::NewTimeEntry,
            timesheet_service::ReviewDecision,
            timesheet_service::AgencyLabor,
        )
    ),
    tags(
        (name = "dining-ops", description = "Dining services operations API"),
        (name = "auth", description = "Login and user accounts"),
        (name = "units", description = "Dining units"),
        (name = "inventory", description = "Stock, movements and the movement log"),
        (name = "invoices", description = "Vendor invoices and unit allocations"),
        (name = "transmittals", description = "Cash deposit transmittals"),
        (name = "recipes", description = "Recipes and costing"),
        (name = "production", description = "Production runs"),
        (name = "eom", description = "Inventory snapshots and month-end COGS"),
        (name = "timesheets", description = "Temp agency labor"),
        (name = "export", description = "CSV downloads")
    )
)]
pub struct ApiDoc;
