//! Services Layer
//!
//! Business rules for every module, independent of HTTP. Handlers resolve
//! the caller into an [`Actor`](crate::domain::Actor) and delegate here.

pub mod eom_service;
pub mod export_service;
pub mod inventory_service;
pub mod invoice_service;
pub mod recipe_service;
pub mod snapshot_service;
pub mod timesheet_service;
pub mod transmittal_service;
pub mod unit_service;

pub use eom_service::{compute_cogs, EomInputs, EomSummary};
pub use recipe_service::scale_recipe;
