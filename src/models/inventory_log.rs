use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// NULL once the item row has been deleted
    pub inventory_id: Option<i32>,
    pub sku: String,
    pub item_name: String,
    pub action: String, // checkin, checkout, waste, transfer, edit, delete
    /// Always positive except for `edit`, where it is the on-hand delta
    pub quantity: f64,
    /// Unit price at the time of the movement
    pub unit_price: f64,
    pub dining_unit_id: i32,
    pub target_unit_id: Option<i32>,
    /// Business date of the movement (YYYY-MM-DD)
    pub log_date: String,
    pub performed_by: String,
    pub notes: Option<String>,
    pub created_at: String,
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

impl Model {
    pub fn value(&self) -> f64 {
        self.quantity * self.unit_price
    }
}
