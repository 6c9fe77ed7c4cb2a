//! Notification service
//!
//! Notifications are created as side effects of assignment-type operations
//! (see the task service); this service only serves the recipient's reads,
//! read-marking and deletes. Ownership is checked on every mutation.

use prody_common::ProdyError;
use prody_persistence::entity::notifications;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};

#[derive(Clone)]
pub struct NotificationService {
    db: DatabaseConnection,
}

impl NotificationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_all(&self, user_id: &str) -> anyhow::Result<Vec<notifications::Model>> {
        Ok(notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .order_by_desc(notifications::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn mark_as_read(
        &self,
        id: &str,
        user_id: &str,
    ) -> anyhow::Result<notifications::Model> {
        let notification = self.find_owned(id, user_id).await?;

        let mut active: notifications::ActiveModel = notification.into();
        active.read = Set(true);
        Ok(active.update(&self.db).await?)
    }

    pub async fn remove(&self, id: &str, user_id: &str) -> anyhow::Result<notifications::Model> {
        let notification = self.find_owned(id, user_id).await?;
        notification.clone().delete(&self.db).await?;
        Ok(notification)
    }

    async fn find_owned(&self, id: &str, user_id: &str) -> anyhow::Result<notifications::Model> {
        notifications::Entity::find()
            .filter(notifications::Column::Id.eq(id))
            .filter(notifications::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                ProdyError::NotFound("Notification not found or access denied".to_string()).into()
            })
    }
}
