//! Analytics service
//!
//! Read-only aggregates over tasks, meetings and users. Admins see their
//! organization, everyone else their own rows.

use prody_common::ROLE_ADMIN;
use prody_persistence::entity::{meetings, tasks, users};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect,
};

use crate::model::{
    DashboardStats, DashboardSummary, MeetingAnalytics, PriorityCount, StatusCount, TaskAnalytics,
    Timeframe,
};
use crate::service::activity_log::ActivityLogService;

type UtcDateTime = chrono::DateTime<chrono::Utc>;

#[derive(Clone)]
pub struct AnalyticsService {
    db: DatabaseConnection,
    activity: ActivityLogService,
}

impl AnalyticsService {
    pub fn new(db: DatabaseConnection, activity: ActivityLogService) -> Self {
        Self { db, activity }
    }

    pub async fn dashboard(
        &self,
        user_id: &str,
        role: &str,
        org_id: Option<&str>,
        from: Option<UtcDateTime>,
        to: Option<UtcDateTime>,
    ) -> anyhow::Result<DashboardSummary> {
        let admin = role == ROLE_ADMIN && org_id.is_some();

        let task_filter = task_scope(admin, user_id, org_id, from, to);
        let meeting_filter = meeting_scope(admin, user_id, org_id, from, to);

        let total_tasks = tasks::Entity::find()
            .filter(task_filter.clone())
            .count(&self.db)
            .await?;
        let total_meetings = meetings::Entity::find()
            .filter(meeting_filter)
            .count(&self.db)
            .await?;

        let new_users_in_period = if admin {
            let mut cond =
                Condition::all().add(users::Column::OrganizationId.eq(org_id.unwrap_or_default()));
            if let Some(from) = from {
                cond = cond.add(users::Column::CreatedAt.gte(from));
            }
            if let Some(to) = to {
                cond = cond.add(users::Column::CreatedAt.lte(to));
            }
            Some(users::Entity::find().filter(cond).count(&self.db).await?)
        } else {
            None
        };

        let status_rows: Vec<(String, i64)> = tasks::Entity::find()
            .select_only()
            .column(tasks::Column::Status)
            .column_as(tasks::Column::Id.count(), "count")
            .filter(task_filter)
            .group_by(tasks::Column::Status)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut recent_activity = self.activity.find_all(user_id, role).await?;
        recent_activity.truncate(5);

        Ok(DashboardSummary {
            scope: if admin { "Organization-wide" } else { "Personal" },
            timeframe: Timeframe {
                from: from.map(|t| t.to_rfc3339()),
                to: to.map(|t| t.to_rfc3339()),
            },
            stats: DashboardStats {
                total_tasks,
                total_meetings,
                new_users_in_period,
            },
            task_status_distribution: status_rows
                .into_iter()
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
            recent_activity,
        })
    }

    pub async fn task_analytics(
        &self,
        user_id: &str,
        role: &str,
        org_id: Option<&str>,
    ) -> anyhow::Result<TaskAnalytics> {
        let admin = role == ROLE_ADMIN && org_id.is_some();
        let filter = task_scope(admin, user_id, org_id, None, None);

        let priority_rows: Vec<(String, i64)> = tasks::Entity::find()
            .select_only()
            .column(tasks::Column::Priority)
            .column_as(tasks::Column::Id.count(), "count")
            .filter(filter.clone())
            .group_by(tasks::Column::Priority)
            .into_tuple()
            .all(&self.db)
            .await?;

        let overdue_tasks = tasks::Entity::find()
            .filter(filter)
            .filter(tasks::Column::Status.ne("completed"))
            .filter(tasks::Column::DueDate.lt(chrono::Utc::now()))
            .count(&self.db)
            .await?;

        Ok(TaskAnalytics {
            priority_breakdown: priority_rows
                .into_iter()
                .map(|(priority, count)| PriorityCount { priority, count })
                .collect(),
            overdue_tasks,
        })
    }

    pub async fn meeting_analytics(
        &self,
        user_id: &str,
        role: &str,
        org_id: Option<&str>,
    ) -> anyhow::Result<MeetingAnalytics> {
        let admin = role == ROLE_ADMIN && org_id.is_some();
        let filter = meeting_scope(admin, user_id, org_id, None, None);

        let intervals: Vec<(UtcDateTime, UtcDateTime)> = meetings::Entity::find()
            .select_only()
            .column(meetings::Column::StartTime)
            .column(meetings::Column::EndTime)
            .filter(filter)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(summarize_meetings(&intervals))
    }
}

fn task_scope(
    admin: bool,
    user_id: &str,
    org_id: Option<&str>,
    from: Option<UtcDateTime>,
    to: Option<UtcDateTime>,
) -> Condition {
    let mut cond = if admin {
        Condition::all().add(tasks::Column::OrganizationId.eq(org_id.unwrap_or_default()))
    } else {
        Condition::all().add(tasks::Column::CreatedBy.eq(user_id))
    };
    if let Some(from) = from {
        cond = cond.add(tasks::Column::CreatedAt.gte(from));
    }
    if let Some(to) = to {
        cond = cond.add(tasks::Column::CreatedAt.lte(to));
    }
    cond
}

fn meeting_scope(
    admin: bool,
    user_id: &str,
    org_id: Option<&str>,
    from: Option<UtcDateTime>,
    to: Option<UtcDateTime>,
) -> Condition {
    let mut cond = if admin {
        Condition::all().add(meetings::Column::OrganizationId.eq(org_id.unwrap_or_default()))
    } else {
        Condition::all().add(meetings::Column::CreatedBy.eq(user_id))
    };
    if let Some(from) = from {
        cond = cond.add(meetings::Column::CreatedAt.gte(from));
    }
    if let Some(to) = to {
        cond = cond.add(meetings::Column::CreatedAt.lte(to));
    }
    cond
}

fn summarize_meetings(intervals: &[(UtcDateTime, UtcDateTime)]) -> MeetingAnalytics {
    let total_minutes: f64 = intervals
        .iter()
        .map(|(start, end)| (*end - *start).num_seconds() as f64 / 60.0)
        .sum();

    let average = if intervals.is_empty() {
        "0".to_string()
    } else {
        format!("{:.0}", total_minutes / intervals.len() as f64)
    };

    MeetingAnalytics {
        total_meetings_in_period: intervals.len(),
        total_hours_spent: format!("{:.1}", total_minutes / 60.0),
        average_meeting_duration: average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn interval(start_min: i64, end_min: i64) -> (UtcDateTime, UtcDateTime) {
        let base = chrono::Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        (
            base + chrono::Duration::minutes(start_min),
            base + chrono::Duration::minutes(end_min),
        )
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize_meetings(&[]);
        assert_eq!(summary.total_meetings_in_period, 0);
        assert_eq!(summary.total_hours_spent, "0.0");
        assert_eq!(summary.average_meeting_duration, "0");
    }

    #[test]
    fn test_summarize_meetings_totals() {
        // 60 min + 30 min = 1.5 h, average 45 min
        let summary = summarize_meetings(&[interval(0, 60), interval(120, 150)]);
        assert_eq!(summary.total_meetings_in_period, 2);
        assert_eq!(summary.total_hours_spent, "1.5");
        assert_eq!(summary.average_meeting_duration, "45");
    }
}
