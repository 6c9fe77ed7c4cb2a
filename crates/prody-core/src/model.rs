//! Domain view models
//!
//! Response shapes returned by services, assembled from entities.

use prody_persistence::entity::{activity_logs, meeting_participants, meetings, users};
use serde::{Deserialize, Serialize};

/// Public user summary embedded in auth responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub org_id: Option<String>,
    pub is_email_verified: bool,
}

impl From<users::Model> for UserSummary {
    fn from(value: users::Model) -> Self {
        Self {
            id: value.id,
            full_name: value.full_name,
            email: value.email,
            avatar_url: value.avatar_url,
            role: value.role,
            org_id: value.organization_id,
            is_email_verified: value.is_email_verified,
        }
    }
}

/// Credential pair plus the holder's summary, returned by every flow that
/// signs the caller in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: UserSummary,
}

/// Outcome of a refresh request: either fresh credentials or a statement
/// that the current ones are still good
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RefreshOutcome {
    Refreshed(AuthResponse),
    StillValid { message: String, expires_in: i64 },
}

/// Actor details joined onto an activity entry at read time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorSummary {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
}

impl From<users::Model> for ActorSummary {
    fn from(value: users::Model) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
        }
    }
}

/// Activity entry with its actor, as listed by the audit endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ActivityLogView {
    #[serde(flatten)]
    pub entry: activity_logs::Model,
    pub user: Option<ActorSummary>,
}

/// Organization member summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub role: String,
}

impl From<users::Model> for MemberSummary {
    fn from(value: users::Model) -> Self {
        Self {
            id: value.id,
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            role: value.role,
        }
    }
}

/// Organization with its members
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub members: Vec<MemberSummary>,
}

/// Meeting with its participant rows
#[derive(Debug, Clone, Serialize)]
pub struct MeetingView {
    #[serde(flatten)]
    pub meeting: meetings::Model,
    pub participants: Vec<meeting_participants::Model>,
}

/// Count per task status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Count per task priority
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityCount {
    pub priority: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeframe {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_tasks: u64,
    pub total_meetings: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_users_in_period: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub scope: &'static str,
    pub timeframe: Timeframe,
    pub stats: DashboardStats,
    pub task_status_distribution: Vec<StatusCount>,
    pub recent_activity: Vec<ActivityLogView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAnalytics {
    pub priority_breakdown: Vec<PriorityCount>,
    pub overdue_tasks: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingAnalytics {
    pub total_meetings_in_period: usize,
    pub total_hours_spent: String,
    pub average_meeting_duration: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> users::Model {
        users::Model {
            id: "u-1".to_string(),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: Some("Lovelace".to_string()),
            full_name: "Ada Lovelace".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            avatar_url: None,
            role: "member".to_string(),
            organization_id: Some("org-1".to_string()),
            is_email_verified: true,
            verification_otp: None,
            otp_expires: None,
            reset_token: None,
            reset_token_exp: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_user_summary_from_entity() {
        let summary = UserSummary::from(user());
        assert_eq!(summary.id, "u-1");
        assert_eq!(summary.org_id.as_deref(), Some("org-1"));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["fullName"], "Ada Lovelace");
        assert_eq!(json["orgId"], "org-1");
        // Internal fields never leak into the summary
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_refresh_outcome_untagged_serialization() {
        let outcome = RefreshOutcome::StillValid {
            message: "Token is still valid, no refresh needed".to_string(),
            expires_in: 1800,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["expires_in"], 1800);
        assert!(json.get("access_token").is_none());
    }
}
