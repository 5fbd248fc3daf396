//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM entities, no Axum).
//! Only trait definitions, access rules, column value types and domain errors.

pub mod access;
pub mod errors;
pub mod repositories;
pub mod values;

pub use access::{Actor, Role, Scope};
pub use errors::DomainError;
pub use repositories::*;
pub use values::*;
