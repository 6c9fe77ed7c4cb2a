//! Meeting service
//!
//! Scheduling treats every meeting as a half-open interval
//! `[start_time, end_time)`; a creator can never hold two overlapping ones.

use std::sync::Arc;

use prody_common::ProdyError;
use prody_persistence::entity::{meeting_participants, meetings};
use prody_persistence::new_entity_id;
use prody_realtime::{Broadcaster, events};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::json;

use crate::model::MeetingView;
use crate::service::activity_log::ActivityLogService;

pub const DEFAULT_MEETING_STATUS: &str = "scheduled";

/// Half-open interval overlap: `[s1,e1)` and `[s2,e2)` conflict iff
/// `s1 < e2 && s2 < e1`. Back-to-back meetings do not conflict.
pub fn overlaps(
    s1: chrono::DateTime<chrono::Utc>,
    e1: chrono::DateTime<chrono::Utc>,
    s2: chrono::DateTime<chrono::Utc>,
    e2: chrono::DateTime<chrono::Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

/// Fields accepted when scheduling a meeting
#[derive(Debug, Clone)]
pub struct CreateMeeting {
    pub title: String,
    pub description: Option<String>,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub meeting_link: Option<String>,
    pub status: Option<String>,
    pub is_recurring: Option<bool>,
}

/// Fields accepted when updating a meeting; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateMeeting {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub meeting_link: Option<String>,
    pub status: Option<String>,
    pub is_recurring: Option<bool>,
}

#[derive(Clone)]
pub struct MeetingService {
    db: DatabaseConnection,
    broadcaster: Arc<Broadcaster>,
    activity: ActivityLogService,
}

impl MeetingService {
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

    /// Schedule a meeting after validating the interval and checking the
    /// creator's calendar for conflicts.
    pub async fn create(
        &self,
        input: CreateMeeting,
        user_id: &str,
        org_id: Option<&str>,
    ) -> anyhow::Result<meetings::Model> {
        if input.start_time >= input.end_time {
            return Err(
                ProdyError::InvalidInput("End time must be after start time".to_string()).into(),
            );
        }

        // Half-open overlap against the creator's existing meetings
        let conflict = meetings::Entity::find()
            .filter(meetings::Column::CreatedBy.eq(user_id))
            .filter(meetings::Column::StartTime.lt(input.end_time))
            .filter(meetings::Column::EndTime.gt(input.start_time))
            .one(&self.db)
            .await?;

        if let Some(conflict) = conflict {
            return Err(ProdyError::InvalidInput(format!(
                "Schedule conflict: You already have a meeting \"{}\" at this time.",
                conflict.title
            ))
            .into());
        }

        let meeting = meetings::ActiveModel {
            id: Set(new_entity_id()),
            title: Set(input.title),
            description: Set(input.description),
            start_time: Set(input.start_time),
            end_time: Set(input.end_time),
            meeting_link: Set(input.meeting_link),
            status: Set(input
                .status
                .unwrap_or_else(|| DEFAULT_MEETING_STATUS.to_string())),
            is_recurring: Set(input.is_recurring.unwrap_or(false)),
            organization_id: Set(org_id.map(str::to_string)),
            created_by: Set(user_id.to_string()),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&self.db)
        .await?;

        self.activity
            .record(
                &self.db,
                user_id,
                "MEETING_CREATED",
                "Meeting",
                Some(&meeting.id),
                Some(&format!("Created meeting: {}", meeting.title)),
            )
            .await?;

        self.broadcaster.send_to_org(
            org_id,
            events::MEETING_CREATED,
            serde_json::to_value(&meeting)?,
        );

        Ok(meeting)
    }

    /// Meetings the user created or participates in, ordered by start time.
    pub async fn find_all(&self, user_id: &str) -> anyhow::Result<Vec<MeetingView>> {
        let joined_ids: Vec<String> = meeting_participants::Entity::find()
            .select_only()
            .column(meeting_participants::Column::MeetingId)
            .filter(meeting_participants::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.db)
            .await?;

        let rows = meetings::Entity::find()
            .filter(
                Condition::any()
                    .add(meetings::Column::CreatedBy.eq(user_id))
                    .add(meetings::Column::Id.is_in(joined_ids)),
            )
            .order_by_asc(meetings::Column::StartTime)
            .find_with_related(meeting_participants::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(meeting, participants)| MeetingView {
                meeting,
                participants,
            })
            .collect())
    }

    pub async fn find_one(&self, id: &str) -> anyhow::Result<MeetingView> {
        let mut rows = meetings::Entity::find_by_id(id)
            .find_with_related(meeting_participants::Entity)
            .all(&self.db)
            .await?;

        match rows.pop() {
            Some((meeting, participants)) => Ok(MeetingView {
                meeting,
                participants,
            }),
            None => Err(ProdyError::NotFound("Meeting not found".to_string()).into()),
        }
    }

    /// Update a meeting; only its creator may do so. A cancellation is
    /// recorded under its own action tag.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateMeeting,
        user_id: &str,
    ) -> anyhow::Result<meetings::Model> {
        let meeting = meetings::Entity::find_by_id(id).one(&self.db).await?;
        let Some(meeting) = meeting.filter(|m| m.created_by == user_id) else {
            return Err(
                ProdyError::Forbidden("Only the creator can update the meeting".to_string()).into(),
            );
        };

        let cancelled = input.status.as_deref() == Some("cancelled");

        let mut active: meetings::ActiveModel = meeting.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(start_time) = input.start_time {
            active.start_time = Set(start_time);
        }
        if let Some(end_time) = input.end_time {
            active.end_time = Set(end_time);
        }
        if let Some(meeting_link) = input.meeting_link {
            active.meeting_link = Set(Some(meeting_link));
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(is_recurring) = input.is_recurring {
            active.is_recurring = Set(is_recurring);
        }
        let updated = active.update(&self.db).await?;

        let action = if cancelled {
            "MEETING_CANCELLED"
        } else {
            "MEETING_UPDATED"
        };
        self.activity
            .record(
                &self.db,
                user_id,
                action,
                "Meeting",
                Some(id),
                Some(&format!("Updated meeting: {}", updated.title)),
            )
            .await?;

        self.broadcaster.send_to_org(
            updated.organization_id.as_deref(),
            events::MEETING_UPDATED,
            serde_json::to_value(&updated)?,
        );

        Ok(updated)
    }

    /// Delete a meeting; only its creator may do so.
    pub async fn remove(&self, id: &str, user_id: &str) -> anyhow::Result<meetings::Model> {
        let meeting = meetings::Entity::find_by_id(id).one(&self.db).await?;
        let Some(meeting) = meeting.filter(|m| m.created_by == user_id) else {
            return Err(
                ProdyError::Forbidden("Only the creator can delete the meeting".to_string()).into(),
            );
        };

        self.activity
            .record(
                &self.db,
                user_id,
                "MEETING_DELETED",
                "Meeting",
                Some(id),
                Some(&format!("Deleted meeting: {}", meeting.title)),
            )
            .await?;

        meeting.clone().delete(&self.db).await?;

        Ok(meeting)
    }

    /// Join a live meeting as an accepted participant and tell the creator.
    pub async fn join(
        &self,
        meeting_id: &str,
        user_id: &str,
    ) -> anyhow::Result<meeting_participants::Model> {
        let meeting = meetings::Entity::find_by_id(meeting_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ProdyError::NotFound("Meeting not found".to_string()))?;

        if meeting.status == "cancelled" || meeting.status == "completed" {
            return Err(ProdyError::InvalidInput(format!(
                "Cannot join a meeting that is {}",
                meeting.status
            ))
            .into());
        }

        let existing = meeting_participants::Entity::find()
            .filter(meeting_participants::Column::MeetingId.eq(meeting_id))
            .filter(meeting_participants::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(ProdyError::Conflict("You are already a participant".to_string()).into());
        }

        let participant = meeting_participants::ActiveModel {
            id: Set(new_entity_id()),
            meeting_id: Set(meeting_id.to_string()),
            user_id: Set(user_id.to_string()),
            status: Set("accepted".to_string()),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&self.db)
        .await?;

        self.activity
            .record(
                &self.db,
                user_id,
                "MEETING_JOINED",
                "Meeting",
                Some(meeting_id),
                Some(&format!("Joined meeting: {}", meeting.title)),
            )
            .await?;

        self.broadcaster.send_to_user(
            &meeting.created_by,
            events::PARTICIPANT_JOINED,
            json!({
                "meetingId": meeting_id,
                "userId": user_id,
                "message": format!("Someone joined {}", meeting.title),
            }),
        );

        Ok(participant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_overlap_partial() {
        // existing [10:00,11:00) vs new [10:30,11:30)
        assert!(overlaps(at(10, 0), at(11, 0), at(10, 30), at(11, 30)));
        // existing [10:00,11:00) vs new [09:30,10:30)
        assert!(overlaps(at(10, 0), at(11, 0), at(9, 30), at(10, 30)));
    }

    #[test]
    fn test_back_to_back_does_not_overlap() {
        // existing [10:00,11:00) vs new [11:00,12:00)
        assert!(!overlaps(at(10, 0), at(11, 0), at(11, 0), at(12, 0)));
        assert!(!overlaps(at(11, 0), at(12, 0), at(10, 0), at(11, 0)));
    }

    #[test]
    fn test_containment_overlaps() {
        // new interval inside the existing one, and the reverse
        assert!(overlaps(at(10, 0), at(12, 0), at(10, 30), at(11, 0)));
        assert!(overlaps(at(10, 30), at(11, 0), at(10, 0), at(12, 0)));
    }

    #[test]
    fn test_identical_intervals_overlap() {
        assert!(overlaps(at(10, 0), at(11, 0), at(10, 0), at(11, 0)));
    }

    #[test]
    fn test_disjoint_intervals() {
        assert!(!overlaps(at(8, 0), at(9, 0), at(13, 0), at(14, 0)));
    }
}
