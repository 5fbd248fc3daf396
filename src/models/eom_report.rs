use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "eom_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub dining_unit_id: i32,
    pub month: i32,
    pub year: i32,
    pub beginning_inventory: f64,
    pub purchases: f64,
    pub transfers_in: f64,
    pub transfers_out: f64,
    pub ending_inventory: f64,
    pub waste: f64,
    pub cogs: f64,
    pub servings: f64,
    pub plate_cost: Option<f64>,
    pub generated_by: String,
    pub generated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dining_unit::Entity",
        from = "Column::DiningUnitId",
        to = "super::dining_unit::Column::Id"
    )]
    DiningUnit,
}

impl Related<super::dining_unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiningUnit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
