//! Task data model types.

use serde::{Deserialize, Serialize};

use crate::users::UserInfo;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub owner_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// The owner-annotated shape returned by admin listings.
#[derive(Debug, Clone, Serialize)]
pub struct TaskWithOwner {
    #[serde(flatten)]
    pub task: Task,
    pub owner: UserInfo,
}

/// Request body for task create and update.
///
/// The same shape serves both: create requires a non-empty title, update
/// treats empty/false values as "leave unchanged" (see `access::merge_fields`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFields {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

/// Joined row backing [`TaskWithOwner`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct TaskOwnerRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub owner_id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub owner_email: String,
}

impl From<TaskOwnerRow> for TaskWithOwner {
    fn from(row: TaskOwnerRow) -> Self {
        TaskWithOwner {
            owner: UserInfo {
                id: row.owner_id.clone(),
                email: row.owner_email,
            },
            task: Task {
                id: row.id,
                title: row.title,
                description: row.description,
                is_completed: row.is_completed,
                owner_id: row.owner_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}
