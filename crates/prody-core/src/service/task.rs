//! Task service
//!
//! Task writes and their assignee notifications are one unit of work; the
//! realtime pushes happen after commit and are best-effort.

use std::sync::Arc;

use prody_common::ProdyError;
use prody_persistence::entity::{notifications, tasks};
use prody_persistence::new_entity_id;
use prody_realtime::{Broadcaster, events};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde_json::json;
use tracing::debug;

use crate::service::activity_log::ActivityLogService;

pub const DEFAULT_STATUS: &str = "pending";
pub const DEFAULT_PRIORITY: &str = "medium";

/// Fields accepted when creating a task
#[derive(Debug, Clone, Default)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub blocker: Option<String>,
    pub assigned_to_id: Option<String>,
}

/// Fields accepted when updating a task; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub task_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub blocker: Option<String>,
    pub assigned_to_id: Option<String>,
}

#[derive(Clone)]
pub struct TaskService {
    db: DatabaseConnection,
    broadcaster: Arc<Broadcaster>,
    activity: ActivityLogService,
}

impl TaskService {
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

    /// Create a task. When an assignee is given, exactly one notification
    /// row is written in the same transaction as the task row.
    pub async fn create(
        &self,
        input: CreateTask,
        user_id: &str,
        org_id: Option<&str>,
    ) -> anyhow::Result<tasks::Model> {
        let now = chrono::Utc::now();
        let tx = self.db.begin().await?;

        let task = tasks::ActiveModel {
            id: Set(new_entity_id()),
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
            status: Set(input.status.unwrap_or_else(|| DEFAULT_STATUS.to_string())),
            priority: Set(input.priority.unwrap_or_else(|| DEFAULT_PRIORITY.to_string())),
            due_date: Set(input.due_date),
            blocker: Set(input.blocker.clone()),
            assigned_to: Set(input.assigned_to_id.clone()),
            created_by: Set(user_id.to_string()),
            organization_id: Set(org_id.map(str::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&tx)
        .await?;

        self.activity
            .record(
                &tx,
                user_id,
                "TASK_CREATED",
                "Task",
                Some(&task.id),
                Some(&format!("Created task: {}", task.title)),
            )
            .await?;

        let assignment_message = format!("You have been assigned to task: {}", task.title);
        if let Some(assignee) = &input.assigned_to_id {
            insert_notification(
                &tx,
                assignee,
                "New Task Assigned",
                &assignment_message,
                "TASK_ASSIGNMENT",
            )
            .await?;
        }

        tx.commit().await?;

        if let Some(assignee) = &input.assigned_to_id {
            self.broadcaster.send_to_user(
                assignee,
                events::NEW_NOTIFICATION,
                json!({
                    "title": "New Task Assigned",
                    "message": assignment_message,
                }),
            );
        }
        let delivered = self.broadcaster.send_to_org(
            org_id,
            events::TASK_CREATED,
            serde_json::to_value(&task)?,
        );
        debug!(task = %task.id, delivered, "task creation broadcast");

        Ok(task)
    }

    /// Tasks the user created or is assigned to, newest first.
    pub async fn my_tasks(&self, user_id: &str) -> anyhow::Result<Vec<tasks::Model>> {
        Ok(tasks::Entity::find()
            .filter(
                Condition::any()
                    .add(tasks::Column::CreatedBy.eq(user_id))
                    .add(tasks::Column::AssignedTo.eq(user_id)),
            )
            .order_by_desc(tasks::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn find_one(&self, id: &str) -> anyhow::Result<tasks::Model> {
        tasks::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ProdyError::NotFound("Task not found".to_string()).into())
    }

    /// Apply a partial update. A changed assignee gets a reassignment
    /// notification in the same transaction; the org room is not notified.
    pub async fn update(&self, input: UpdateTask, user_id: &str) -> anyhow::Result<tasks::Model> {
        let tx = self.db.begin().await?;

        let current = tasks::Entity::find_by_id(&input.task_id)
            .one(&tx)
            .await?
            .ok_or_else(|| ProdyError::NotFound("Task not found".to_string()))?;

        let previous_assignee = current.assigned_to.clone();
        let reassigned = input
            .assigned_to_id
            .as_ref()
            .is_some_and(|a| previous_assignee.as_deref() != Some(a));

        let mut changes: Vec<&str> = Vec::new();
        let mut active: tasks::ActiveModel = current.into();
        if let Some(title) = input.title {
            active.title = Set(title);
            changes.push("title");
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
            changes.push("description");
        }
        if let Some(status) = input.status {
            active.status = Set(status);
            changes.push("status");
        }
        if let Some(priority) = input.priority {
            active.priority = Set(priority);
            changes.push("priority");
        }
        if let Some(due_date) = input.due_date {
            active.due_date = Set(Some(due_date));
            changes.push("dueDate");
        }
        if let Some(blocker) = input.blocker {
            active.blocker = Set(Some(blocker));
            changes.push("blocker");
        }
        if let Some(assignee) = &input.assigned_to_id {
            active.assigned_to = Set(Some(assignee.clone()));
            changes.push("assignedTo");
        }
        active.updated_at = Set(chrono::Utc::now());
        let updated = active.update(&tx).await?;

        self.activity
            .record(
                &tx,
                user_id,
                "TASK_UPDATED",
                "Task",
                Some(&updated.id),
                Some(&format!("Updated fields: {}", changes.join(", "))),
            )
            .await?;

        if reassigned && let Some(assignee) = input.assigned_to_id.as_deref() {
            insert_notification(
                &tx,
                assignee,
                "Task Assignment Updated",
                &format!("Task \"{}\" has been reassigned to you.", updated.title),
                "TASK_REASSIGNMENT",
            )
            .await?;
        }

        tx.commit().await?;

        // Push to the new assignee if one was set, otherwise the current one
        if let Some(recipient) = input.assigned_to_id.as_deref().or(previous_assignee.as_deref()) {
            self.broadcaster.send_to_user(
                recipient,
                events::NEW_NOTIFICATION,
                json!({
                    "title": "Task Updated",
                    "message": format!("Task \"{}\" has been updated.", updated.title),
                }),
            );
        }

        Ok(updated)
    }

    /// Delete a task. Notifications are never touched here.
    pub async fn remove(&self, task_id: &str, user_id: &str) -> anyhow::Result<String> {
        let task = tasks::Entity::find_by_id(task_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ProdyError::NotFound("Task not found".to_string()))?;

        let title = task.title.clone();
        task.delete(&self.db).await?;

        self.activity
            .record(
                &self.db,
                user_id,
                "TASK_DELETED",
                "Task",
                Some(task_id),
                Some(&format!("Deleted task: {}", title)),
            )
            .await?;

        Ok("Task deleted successfully".to_string())
    }
}

async fn insert_notification<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    title: &str,
    message: &str,
    kind: &str,
) -> anyhow::Result<notifications::Model> {
    Ok(notifications::ActiveModel {
        id: Set(new_entity_id()),
        user_id: Set(user_id.to_string()),
        title: Set(title.to_string()),
        message: Set(message.to_string()),
        kind: Set(kind.to_string()),
        read: Set(false),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(conn)
    .await?)
}
