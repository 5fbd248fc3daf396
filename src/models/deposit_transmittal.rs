use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deposit_transmittals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub reference: String,
    pub dining_unit_id: i32,
    pub deposit_date: String,
    pub currency_amount: f64,
    pub coin_amount: f64,
    pub check_amount: f64,
    pub total_amount: f64,
    /// Tamper-evident bag number written on the deposit slip
    pub bag_number: Option<String>,
    pub prepared_by: String,
    pub status: String, // 'Submitted', 'Verified'
    pub verified_by: Option<String>,
    pub verified_at: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
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
