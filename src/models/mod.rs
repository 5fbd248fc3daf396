pub mod deposit_transmittal;
pub mod dining_unit;
pub mod eom_report;
pub mod inventory_item;
pub mod inventory_log;
pub mod inventory_snapshot;
pub mod invoice_log;
pub mod production_log;
pub mod recipe;
pub mod temp_agency;
pub mod temp_time_entry;
pub mod user;

pub use invoice_log::{Allocation, InvoiceDto};
