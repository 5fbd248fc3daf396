//! SeaORM implementation of RecipeRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::{DomainError, Recipe, RecipeFilter, RecipeInput, RecipeRepository};
use crate::models::recipe::{ActiveModel, Column, Entity as RecipeEntity};

/// SeaORM-based implementation of RecipeRepository
pub struct SeaOrmRecipeRepository {
    db: DatabaseConnection,
}

impl SeaOrmRecipeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecipeRepository for SeaOrmRecipeRepository {
    async fn find_all(&self, filter: RecipeFilter) -> Result<Vec<Recipe>, DomainError> {
        let mut query = RecipeEntity::find().order_by_asc(Column::Name);

        if let Some(unit_id) = filter.dining_unit_id {
            query = query.filter(
                Condition::any()
                    .add(Column::DiningUnitId.eq(unit_id))
                    .add(Column::DiningUnitId.is_null()),
            );
        }

        if let Some(name) = &filter.name
            && !name.is_empty()
        {
            query = query.filter(Column::Name.contains(name));
        }

        let recipes = query.all(&self.db).await?;
        recipes
            .into_iter()
            .map(|model| Recipe::try_from(model).map_err(DomainError::from))
            .collect()
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Recipe>, DomainError> {
        match RecipeEntity::find_by_id(id).one(&self.db).await? {
            Some(model) => Ok(Some(Recipe::try_from(model)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, input: RecipeInput) -> Result<Recipe, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let new_recipe = ActiveModel {
            name: Set(input.name),
            yield_servings: Set(input.yield_servings),
            dining_unit_id: Set(input.dining_unit_id),
            items: Set(serde_json::to_string(&input.items)?),
            notes: Set(input.notes),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_recipe.insert(&self.db).await?;
        Ok(Recipe::try_from(result)?)
    }

    async fn update(&self, id: i32, input: RecipeInput) -> Result<Recipe, DomainError> {
        let existing = RecipeEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Recipe"))?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(input.name);
        active.yield_servings = Set(input.yield_servings);
        active.dining_unit_id = Set(input.dining_unit_id);
        active.items = Set(serde_json::to_string(&input.items)?);
        active.notes = Set(input.notes);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active.update(&self.db).await?;
        Ok(Recipe::try_from(result)?)
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = RecipeEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Recipe"));
        }

        Ok(())
    }
}
