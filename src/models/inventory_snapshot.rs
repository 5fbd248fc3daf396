use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_snapshots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "unit")]
    pub dining_unit_id: i32,
    pub month: i32,
    pub year: i32,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: String, // 'beginning', 'ending'
    /// Extended inventory value in dollars
    pub amount: f64,
    pub captured_by: String,
    pub captured_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
