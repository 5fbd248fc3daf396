//! Repository implementations using SeaORM

pub mod dining_unit_repository;
pub mod recipe_repository;

pub use dining_unit_repository::SeaOrmDiningUnitRepository;
pub use recipe_repository::SeaOrmRecipeRepository;
