//! Activity log service
//!
//! Durable append-only audit trail, fanned out to live subscribers in the
//! actor's organization room.

use std::sync::Arc;

use prody_common::ROLE_ADMIN;
use prody_persistence::entity::{activity_logs, users};
use prody_persistence::new_entity_id;
use prody_realtime::{Broadcaster, events};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use crate::model::{ActivityLogView, ActorSummary};

/// Listings return at most this many entries, most recent first
pub const LISTING_CAP: u64 = 100;

#[derive(Clone)]
pub struct ActivityLogService {
    db: DatabaseConnection,
    broadcaster: Arc<Broadcaster>,
}

impl ActivityLogService {
    pub fn new(db: DatabaseConnection, broadcaster: Arc<Broadcaster>) -> Self {
        Self { db, broadcaster }
    }

    /// Append one entry and fan it out to the actor's organization room.
    ///
    /// `conn` is whatever unit of work the caller is inside - the plain
    /// connection or an open transaction; callers never branch on which.
    /// The fan-out is best-effort: an empty room or a failed serialization
    /// never fails the write, which is the durable source of truth.
    pub async fn record<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        action: &str,
        entity_type: &str,
        entity_id: Option<&str>,
        details: Option<&str>,
    ) -> anyhow::Result<activity_logs::Model> {
        let entry = activity_logs::ActiveModel {
            id: Set(new_entity_id()),
            user_id: Set(user_id.to_string()),
            action: Set(action.to_string()),
            entity_type: Set(entity_type.to_string()),
            entity_id: Set(entity_id.map(str::to_string)),
            details: Set(details.map(str::to_string)),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(conn)
        .await?;

        // Resolve the actor's organization through the same unit of work
        let actor = users::Entity::find_by_id(&entry.user_id).one(conn).await?;

        if let Some(org_id) = actor.and_then(|u| u.organization_id) {
            match serde_json::to_value(&entry) {
                Ok(payload) => {
                    let delivered =
                        self.broadcaster
                            .send_to_org(Some(&org_id), events::NEW_ACTIVITY_LOG, payload);
                    debug!(action, org = %org_id, delivered, "activity entry fanned out");
                }
                Err(e) => {
                    debug!(action, "skipping activity fan-out: {}", e);
                }
            }
        }

        Ok(entry)
    }

    /// List entries visible to the requester, most recent first.
    ///
    /// Admins see their whole organization's trail; everyone else sees only
    /// entries they produced themselves.
    pub async fn find_all(
        &self,
        requester_id: &str,
        role: &str,
    ) -> anyhow::Result<Vec<ActivityLogView>> {
        let mut select = activity_logs::Entity::find().find_also_related(users::Entity);

        let admin_org = if role == ROLE_ADMIN {
            users::Entity::find_by_id(requester_id)
                .one(&self.db)
                .await?
                .and_then(|u| u.organization_id)
        } else {
            None
        };

        select = match admin_org {
            Some(org_id) => select.filter(users::Column::OrganizationId.eq(org_id)),
            // An admin without an organization falls back to personal scope
            None => select.filter(activity_logs::Column::UserId.eq(requester_id)),
        };

        let rows = select
            .order_by_desc(activity_logs::Column::CreatedAt)
            .limit(LISTING_CAP)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(entry, actor)| ActivityLogView {
                entry,
                user: actor.map(ActorSummary::from),
            })
            .collect())
    }
}
