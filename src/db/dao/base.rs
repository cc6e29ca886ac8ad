use chrono::Utc;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    IntoActiveModel, Order, PrimaryKeyTrait, QueryOrder, Select,
};

use super::base_traits::{HasCreatedAtColumn, TimestampedActiveModel};
use super::error::{DaoLayerError, DaoResult};

/// Generic CRUD over an entity keyed by an auto-assigned integer id.
#[async_trait::async_trait]
pub trait DaoBase: Clone + Send + Sync + Sized
where
    <Self::Entity as EntityTrait>::Model: FromQueryResult
        + IntoActiveModel<<Self::Entity as EntityTrait>::ActiveModel>
        + Clone
        + Send
        + Sync,
    <Self::Entity as EntityTrait>::ActiveModel: ActiveModelTrait<Entity = Self::Entity>
        + ActiveModelBehavior
        + TimestampedActiveModel
        + Send,
    <<Self::Entity as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType:
        From<i32> + Send + Sync,
    Self::Entity: HasCreatedAtColumn,
{
    type Entity: EntityTrait + Send + Sync;

    fn from_db(db: DatabaseConnection) -> Self;

    fn new(db: &DatabaseConnection) -> Self {
        Self::from_db(db.clone())
    }

    fn db(&self) -> &DatabaseConnection;

    fn entity_name() -> &'static str {
        std::any::type_name::<Self::Entity>()
    }

    async fn create(
        &self,
        data: impl IntoActiveModel<<Self::Entity as EntityTrait>::ActiveModel> + Send,
    ) -> DaoResult<<Self::Entity as EntityTrait>::Model> {
        let mut active = data.into_active_model();
        active.set_created_at(Utc::now().fixed_offset());
        active.insert(self.db()).await.map_err(DaoLayerError::Db)
    }

    async fn find_by_id(&self, id: i32) -> DaoResult<<Self::Entity as EntityTrait>::Model> {
        let model = Self::Entity::find_by_id(id)
            .one(self.db())
            .await
            .map_err(DaoLayerError::Db)?;

        model.ok_or(DaoLayerError::NotFound {
            entity: Self::entity_name(),
            id,
        })
    }

    /// Every row, oldest first unless `order` says otherwise.
    async fn find_all(
        &self,
        order: Option<(<Self::Entity as EntityTrait>::Column, Order)>,
        apply: impl FnOnce(Select<Self::Entity>) -> Select<Self::Entity> + Send,
    ) -> DaoResult<Vec<<Self::Entity as EntityTrait>::Model>> {
        let filtered = apply(Self::Entity::find());
        let ordered = match order {
            Some((column, order)) => filtered.order_by(column, order),
            None => filtered.order_by_asc(Self::Entity::created_at_column()),
        };
        ordered.all(self.db()).await.map_err(DaoLayerError::Db)
    }

    /// Loads the row, lets `apply` mark the columns to change and writes it
    /// back. When `apply` changes nothing the stored row is returned as is.
    async fn update<F>(&self, id: i32, apply: F) -> DaoResult<<Self::Entity as EntityTrait>::Model>
    where
        F: for<'a> FnOnce(&'a mut <Self::Entity as EntityTrait>::ActiveModel) + Send,
    {
        let model = self.find_by_id(id).await?;

        let mut active = model.clone().into_active_model();
        apply(&mut active);
        if !active.is_changed() {
            return Ok(model);
        }

        active.update(self.db()).await.map_err(|err| match err {
            sea_orm::DbErr::RecordNotUpdated => DaoLayerError::NotFound {
                entity: Self::entity_name(),
                id,
            },
            other => DaoLayerError::Db(other),
        })
    }

    async fn delete(&self, id: i32) -> DaoResult<i32> {
        let result = Self::Entity::delete_by_id(id)
            .exec(self.db())
            .await
            .map_err(DaoLayerError::Db)?;

        if result.rows_affected == 0 {
            return Err(DaoLayerError::NotFound {
                entity: Self::entity_name(),
                id,
            });
        }

        Ok(id)
    }
}
