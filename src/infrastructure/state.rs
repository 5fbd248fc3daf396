//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{DiningUnitRepository, RecipeRepository};
use crate::infrastructure::{SeaOrmDiningUnitRepository, SeaOrmRecipeRepository};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection used by the transactional services
    db: DatabaseConnection,
    /// Dining unit repository
    pub unit_repo: Arc<dyn DiningUnitRepository>,
    /// Recipe repository
    pub recipe_repo: Arc<dyn RecipeRepository>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection) -> Self {
        let unit_repo = Arc::new(SeaOrmDiningUnitRepository::new(db.clone()));
        let recipe_repo = Arc::new(SeaOrmRecipeRepository::new(db.clone()));

        Self {
            db,
            unit_repo,
            recipe_repo,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl AsRef<DatabaseConnection> for AppState {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
