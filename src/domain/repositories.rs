//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;

/// Dining unit data for API responses
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, utoipa::ToSchema)]
pub struct DiningUnit {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub is_active: bool,
}

/// Repository trait for DiningUnit entity
#[async_trait]
pub trait DiningUnitRepository: Send + Sync {
    /// Find units, optionally including deactivated ones
    async fn find_all(&self, include_inactive: bool) -> Result<Vec<DiningUnit>, DomainError>;

    /// Find a unit by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<DiningUnit>, DomainError>;

    /// Create a new unit
    async fn create(&self, name: String, code: String) -> Result<DiningUnit, DomainError>;

    /// Activate or deactivate a unit
    async fn set_active(&self, id: i32, active: bool) -> Result<DiningUnit, DomainError>;
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, utoipa::ToSchema)]
pub struct RecipeItem {
    pub sku: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
}

/// Recipe data for API responses
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct Recipe {
    pub id: i32,
    pub name: String,
    /// Servings produced by one batch
    pub yield_servings: f64,
    /// `None` for recipes shared by every unit
    pub dining_unit_id: Option<i32>,
    pub items: Vec<RecipeItem>,
    pub notes: Option<String>,
}

/// Input for creating or replacing a recipe
#[derive(Debug, Clone, serde::Deserialize, utoipa::ToSchema)]
pub struct RecipeInput {
    pub name: String,
    pub yield_servings: f64,
    pub dining_unit_id: Option<i32>,
    pub items: Vec<RecipeItem>,
    pub notes: Option<String>,
}

/// Filter criteria for recipe queries
#[derive(Debug, Default, Clone, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeFilter {
    /// Unit-specific recipes of this unit plus shared recipes
    pub dining_unit_id: Option<i32>,
    pub name: Option<String>,
}

/// Repository trait for Recipe entity
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Find all recipes matching the filter, ordered by name
    async fn find_all(&self, filter: RecipeFilter) -> Result<Vec<Recipe>, DomainError>;

    /// Find a recipe by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Recipe>, DomainError>;

    /// Create a new recipe
    async fn create(&self, input: RecipeInput) -> Result<Recipe, DomainError>;

    /// Replace an existing recipe
    async fn update(&self, id: i32, input: RecipeInput) -> Result<Recipe, DomainError>;

    /// Delete a recipe
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}
