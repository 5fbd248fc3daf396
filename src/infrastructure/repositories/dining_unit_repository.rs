//! SeaORM implementation of DiningUnitRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{DiningUnit, DiningUnitRepository, DomainError};
use crate::models::dining_unit::{ActiveModel, Column, Entity as DiningUnitEntity};

/// SeaORM-based implementation of DiningUnitRepository
pub struct SeaOrmDiningUnitRepository {
    db: DatabaseConnection,
}

impl SeaOrmDiningUnitRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DiningUnitRepository for SeaOrmDiningUnitRepository {
    async fn find_all(&self, include_inactive: bool) -> Result<Vec<DiningUnit>, DomainError> {
        let mut query = DiningUnitEntity::find().order_by_asc(Column::Name);
        if !include_inactive {
            query = query.filter(Column::IsActive.eq(true));
        }

        let units = query.all(&self.db).await?;
        Ok(units.into_iter().map(DiningUnit::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<DiningUnit>, DomainError> {
        let unit = DiningUnitEntity::find_by_id(id).one(&self.db).await?;
        Ok(unit.map(DiningUnit::from))
    }

    async fn create(&self, name: String, code: String) -> Result<DiningUnit, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let new_unit = ActiveModel {
            name: Set(name),
            code: Set(code),
            is_active: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = new_unit.insert(&self.db).await?;
        Ok(result.into())
    }

    async fn set_active(&self, id: i32, active: bool) -> Result<DiningUnit, DomainError> {
        let existing = DiningUnitEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Dining unit"))?;

        let mut active_model: ActiveModel = existing.into();
        active_model.is_active = Set(active);
        active_model.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active_model.update(&self.db).await?;
        Ok(result.into())
    }
}
