use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Unique per dining unit, not globally
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    /// Counting unit (case, lb, each, ...)
    pub uom: String,
    pub qty_on_hand: f64,
    pub unit_price: f64,
    pub dining_unit_id: i32,
    pub reorder_level: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dining_unit::Entity",
        from = "Column::DiningUnitId",
        to = "super::dining_unit::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    DiningUnit,
}

impl Related<super::dining_unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiningUnit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn extended_value(&self) -> f64 {
        self.qty_on_hand * self.unit_price
    }

    pub fn is_low_stock(&self) -> bool {
        self.qty_on_hand <= self.reorder_level
    }
}
