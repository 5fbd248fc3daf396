pub mod auth;
pub mod eom;
pub mod error;
pub mod export;
pub mod health;
pub mod inventory;
pub mod invoices;
pub mod recipes;
pub mod timesheets;
pub mod units;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::infrastructure::AppState;

pub use error::{ApiError, ApiResult};

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/users", post(auth::create_user))
        .route("/auth/me", get(auth::get_me))
        // Dining units
        .route("/units", get(units::list_units).post(units::create_unit))
        .route("/units/:id", delete(units::deactivate_unit))
        // Inventory
        .route(
            "/inventory",
            get(inventory::list_items).post(inventory::create_item),
        )
        .route("/inventory/low-stock", get(inventory::low_stock))
        .route("/inventory/logs", get(inventory::list_logs))
        .route("/inventory/sku/:sku", get(inventory::lookup_sku))
        .route("/inventory/value/:unit_id", get(inventory::inventory_value))
        .route("/inventory/checkin", post(inventory::check_in))
        .route("/inventory/checkout", post(inventory::check_out))
        .route("/inventory/waste", post(inventory::record_waste))
        .route("/inventory/transfer", post(inventory::transfer))
        .route(
            "/inventory/:id",
            get(inventory::get_item)
                .put(inventory::edit_item)
                .delete(inventory::delete_item),
        )
        // Invoices
        .route(
            "/invoices",
            get(invoices::list_invoices).post(invoices::submit_invoice),
        )
        .route(
            "/invoices/:id",
            get(invoices::get_invoice).delete(invoices::delete_invoice),
        )
        .route("/invoices/:id/process", put(invoices::process_invoice))
        .route("/invoices/:id/attachments", post(invoices::add_attachment))
        // Deposit transmittals
        .route(
            "/transmittals",
            get(invoices::list_transmittals).post(invoices::create_transmittal),
        )
        .route("/transmittals/:id", get(invoices::get_transmittal))
        .route("/transmittals/:id/verify", put(invoices::verify_transmittal))
        // Recipes & production
        .route(
            "/recipes",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route(
            "/recipes/:id",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route("/recipes/:id/cost", get(recipes::cost_recipe))
        .route(
            "/production",
            get(recipes::list_production).post(recipes::log_production),
        )
        // Month end
        .route(
            "/snapshots",
            get(eom::list_snapshots).post(eom::save_snapshot),
        )
        .route("/eom", get(eom::list_reports).post(eom::run_eom))
        // Temp labor
        .route(
            "/timesheets/agencies",
            get(timesheets::list_agencies).post(timesheets::create_agency),
        )
        .route(
            "/timesheets",
            get(timesheets::list_entries).post(timesheets::submit_entry),
        )
        .route("/timesheets/summary", get(timesheets::labor_summary))
        .route("/timesheets/:id/review", put(timesheets::review_entry))
        // CSV exports
        .route("/export/inventory", get(export::export_inventory))
        .route("/export/inventory-logs", get(export::export_inventory_logs))
        .route("/export/invoices", get(export::export_invoices))
        .route("/export/timesheets", get(export::export_timesheets))
        .route("/export/eom", get(export::export_eom))
        .with_state(state)
}
