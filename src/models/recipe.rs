use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{Recipe, RecipeItem};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_name = "yield")]
    pub yield_servings: f64,
    pub dining_unit_id: Option<i32>,
    /// JSON array of recipe items: [{sku, quantity, unit}]
    pub items: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Recipe {
    type Error = serde_json::Error;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let items: Vec<RecipeItem> = serde_json::from_str(&model.items)?;
        Ok(Recipe {
            id: model.id,
            name: model.name,
            yield_servings: model.yield_servings,
            dining_unit_id: model.dining_unit_id,
            items,
            notes: model.notes,
        })
    }
}
