//! Organization service
//!
//! Creating an organization promotes the creator to its admin in the same
//! unit of work.

use std::sync::Arc;

use prody_common::utils::slugify;
use prody_common::{ProdyError, ROLE_ADMIN};
use prody_persistence::entity::{organizations, users};
use prody_persistence::new_entity_id;
use prody_realtime::{Broadcaster, events};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde_json::json;

use crate::model::{MemberSummary, OrganizationView};
use crate::service::activity_log::ActivityLogService;

#[derive(Clone)]
pub struct OrganizationService {
    db: DatabaseConnection,
    broadcaster: Arc<Broadcaster>,
    activity: ActivityLogService,
}

impl OrganizationService {
    pub fn new(
        db: DatabaseConnection,
        broadcaster: Arc<Broadcaster>,
        activity: ActivityLogService,
    ) -> Self {
        Self {
            db,
            broadcaster,
            activity,
        }
    }

    /// Create an organization and make the caller its admin.
    pub async fn create(&self, name: &str, user_id: &str) -> anyhow::Result<organizations::Model> {
        let slug = slugify(name);

        let existing = organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(&slug))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(ProdyError::Conflict(
                "Organization name or slug already taken".to_string(),
            )
            .into());
        }

        let tx = self.db.begin().await?;

        let org = organizations::ActiveModel {
            id: Set(new_entity_id()),
            name: Set(name.to_string()),
            slug: Set(slug),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&tx)
        .await?;

        let user = users::Entity::find_by_id(user_id)
            .one(&tx)
            .await?
            .ok_or_else(|| ProdyError::NotFound("User not found".to_string()))?;
        let mut active: users::ActiveModel = user.into();
        active.organization_id = Set(Some(org.id.clone()));
        active.role = Set(ROLE_ADMIN.to_string());
        active.updated_at = Set(chrono::Utc::now());
        active.update(&tx).await?;

        self.activity
            .record(
                &tx,
                user_id,
                "ORG_CREATED",
                "Organization",
                Some(&org.id),
                Some(&format!("Created {}", name)),
            )
            .await?;

        tx.commit().await?;

        self.broadcaster.send_to_user(
            user_id,
            events::ORG_JOINED,
            json!({
                "orgId": org.id,
                "role": ROLE_ADMIN,
                "message": format!("Welcome to {}", org.name),
            }),
        );

        Ok(org)
    }

    /// The caller's organization with its member summaries.
    pub async fn my_organization(&self, org_id: Option<&str>) -> anyhow::Result<OrganizationView> {
        let org_id =
            org_id.ok_or_else(|| ProdyError::NotFound("Organization not found".to_string()))?;

        let org = organizations::Entity::find_by_id(org_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ProdyError::NotFound("Organization not found".to_string()))?;

        let members = users::Entity::find()
            .filter(users::Column::OrganizationId.eq(org_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(MemberSummary::from)
            .collect();

        Ok(OrganizationView {
            id: org.id,
            name: org.name,
            slug: org.slug,
            created_at: org.created_at,
            members,
        })
    }
}
