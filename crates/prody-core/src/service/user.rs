//! User lookup helpers shared by auth and organization flows

use prody_common::ProdyError;
use prody_persistence::entity::users;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::model::UserSummary;

pub async fn find_summary(db: &DatabaseConnection, user_id: &str) -> anyhow::Result<UserSummary> {
    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ProdyError::NotFound("User not found".to_string()))?;

    Ok(UserSummary::from(user))
}

pub async fn find_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> anyhow::Result<Option<users::Model>> {
    Ok(users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await?)
}
