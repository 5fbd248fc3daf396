use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub vendor: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub invoice_total: f64,
    /// JSON array of [`Allocation`]
    pub allocations: String,
    pub status: String, // 'Submitted', 'Processed'
    /// JSON array of storage references
    pub attachments: String,
    /// Unit that submitted the invoice
    pub dining_unit_id: i32,
    pub submitted_by: String,
    pub processed_by: Option<String>,
    pub processed_at: Option<String>,
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

/// Share of an invoice charged to one dining unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Allocation {
    pub dining_unit_id: i32,
    /// General-ledger account, when accounting splits by category
    pub gl_code: Option<String>,
    pub amount: f64,
}

/// Invoice with its JSON columns decoded
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InvoiceDto {
    pub id: i32,
    pub vendor: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub invoice_total: f64,
    pub allocations: Vec<Allocation>,
    pub status: String,
    pub attachments: Vec<String>,
    pub dining_unit_id: i32,
    pub submitted_by: String,
    pub processed_by: Option<String>,
    pub processed_at: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl Model {
    pub fn allocation_list(&self) -> Result<Vec<Allocation>, serde_json::Error> {
        serde_json::from_str(&self.allocations)
    }

    pub fn attachment_list(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_str(&self.attachments)
    }

    /// Amount charged to a unit by this invoice
    pub fn allocated_to(&self, unit_id: i32) -> Result<f64, serde_json::Error> {
        Ok(self
            .allocation_list()?
            .iter()
            .filter(|a| a.dining_unit_id == unit_id)
            .map(|a| a.amount)
            .sum())
    }
}

impl TryFrom<Model> for InvoiceDto {
    type Error = serde_json::Error;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let allocations = model.allocation_list()?;
        let attachments = model.attachment_list()?;
        Ok(Self {
            id: model.id,
            vendor: model.vendor,
            invoice_number: model.invoice_number,
            invoice_date: model.invoice_date,
            invoice_total: model.invoice_total,
            allocations,
            status: model.status,
            attachments,
            dining_unit_id: model.dining_unit_id,
            submitted_by: model.submitted_by,
            processed_by: model.processed_by,
            processed_at: model.processed_at,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}
