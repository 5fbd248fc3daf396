use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "temp_time_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub unit_id: i32,
    pub agency_id: i32,
    pub worker_name: String,
    pub work_date: String,
    pub hours_worked: f64,
    pub hourly_rate: f64,
    pub status: String, // 'Pending', 'Approved', 'Rejected'
    pub submitted_by: String,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::temp_agency::Entity",
        from = "Column::AgencyId",
        to = "super::temp_agency::Column::Id"
    )]
    TempAgency,
    #[sea_orm(
        belongs_to = "super::dining_unit::Entity",
        from = "Column::UnitId",
        to = "super::dining_unit::Column::Id"
    )]
    DiningUnit,
}

impl Related<super::temp_agency::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TempAgency.def()
    }
}

impl Related<super::dining_unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiningUnit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn cost(&self) -> f64 {
        self.hours_worked * self.hourly_rate
    }
}
