// SPDX-License-Identifier: MIT
//! Task SQLite operations.

use anyhow::Result;
use sqlx::SqlitePool;

use super::model::{Task, TaskFields, TaskOwnerRow, TaskWithOwner};
use crate::storage::unixepoch;
use crate::users::model::new_id;

pub struct TaskStorage {
    pub(crate) pool: SqlitePool,
}

impl TaskStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new task owned by `owner_id`. The owner comes from the
    /// authenticated principal, never from the request payload.
    pub async fn create(&self, owner_id: &str, fields: &TaskFields) -> Result<Task> {
        let id = new_id();
        let now = unixepoch();
        sqlx::query(
            "INSERT INTO tasks (id, title, description, is_completed, owner_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.is_completed)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("task not found after insert"))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Task>> {
        Ok(sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn list_by_owner(&self, owner_id: &str, skip: i64, limit: i64) -> Result<Vec<Task>> {
        Ok(sqlx::query_as(
            "SELECT * FROM tasks WHERE owner_id = ? \
             ORDER BY created_at ASC, id ASC LIMIT ? OFFSET ?",
        )
        .bind(owner_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Admin listing: every task joined with its owner's id/email.
    pub async fn list_all_with_owners(&self, skip: i64, limit: i64) -> Result<Vec<TaskWithOwner>> {
        let rows: Vec<TaskOwnerRow> = sqlx::query_as(
            "SELECT t.id, t.title, t.description, t.is_completed, t.owner_id, \
                    t.created_at, t.updated_at, u.email AS owner_email \
             FROM tasks t JOIN users u ON u.id = t.owner_id \
             ORDER BY t.created_at ASC, t.id ASC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(TaskWithOwner::from).collect())
    }

    /// Write back a merged task. The caller applies the merge policy
    /// (`access::merge_fields`) first; this persists the result as-is.
    /// `owner_id` is deliberately not in the SET list.
    pub async fn update(&self, task: &Task) -> Result<Task> {
        let now = unixepoch();
        sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, is_completed = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.is_completed)
        .bind(now)
        .bind(&task.id)
        .execute(&self.pool)
        .await?;
        self.get(&task.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("task not found after update"))
    }

    /// Hard delete. Returns whether a row existed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::users::{Role, UserStorage};

    async fn make_pool() -> SqlitePool {
        Storage::new_in_memory().await.unwrap().pool()
    }

    async fn seed_user(pool: &SqlitePool, email: &str) -> String {
        UserStorage::new(pool.clone())
            .create(email, "$argon2id$stub", Role::User)
            .await
            .unwrap()
            .id
    }

    fn fields(title: &str) -> TaskFields {
        TaskFields {
            title: title.to_string(),
            description: None,
            is_completed: false,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = make_pool().await;
        let alice = seed_user(&pool, "alice@example.com").await;
        let s = TaskStorage::new(pool);

        let t = s.create(&alice, &fields("Buy milk")).await.unwrap();
        assert_eq!(t.title, "Buy milk");
        assert_eq!(t.owner_id, alice);
        assert!(!t.is_completed);

        let fetched = s.get(&t.id).await.unwrap().expect("should exist");
        assert_eq!(fetched, t);
    }

    #[tokio::test]
    async fn test_list_by_owner_filters() {
        let pool = make_pool().await;
        let alice = seed_user(&pool, "alice@example.com").await;
        let bob = seed_user(&pool, "bob@example.com").await;
        let s = TaskStorage::new(pool);

        s.create(&alice, &fields("A1")).await.unwrap();
        s.create(&alice, &fields("A2")).await.unwrap();
        s.create(&bob, &fields("B1")).await.unwrap();

        let mine = s.list_by_owner(&alice, 0, 100).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|t| t.owner_id == alice));
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let pool = make_pool().await;
        let alice = seed_user(&pool, "alice@example.com").await;
        let s = TaskStorage::new(pool);
        for i in 0..5 {
            s.create(&alice, &fields(&format!("T{i}"))).await.unwrap();
        }
        let page = s.list_by_owner(&alice, 2, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].title, "T2");
        assert_eq!(page[1].title, "T3");
    }

    #[tokio::test]
    async fn test_list_all_with_owners() {
        let pool = make_pool().await;
        let alice = seed_user(&pool, "alice@example.com").await;
        let bob = seed_user(&pool, "bob@example.com").await;
        let s = TaskStorage::new(pool);
        s.create(&alice, &fields("A1")).await.unwrap();
        s.create(&bob, &fields("B1")).await.unwrap();

        let all = s.list_all_with_owners(0, 100).await.unwrap();
        assert_eq!(all.len(), 2);
        let owners: Vec<&str> = all.iter().map(|t| t.owner.email.as_str()).collect();
        assert!(owners.contains(&"alice@example.com"));
        assert!(owners.contains(&"bob@example.com"));
    }

    #[tokio::test]
    async fn test_update_persists_merged_task() {
        let pool = make_pool().await;
        let alice = seed_user(&pool, "alice@example.com").await;
        let s = TaskStorage::new(pool);
        let mut t = s.create(&alice, &fields("Old")).await.unwrap();
        t.title = "New".to_string();
        t.is_completed = true;
        let updated = s.update(&t).await.unwrap();
        assert_eq!(updated.title, "New");
        assert!(updated.is_completed);
        assert_eq!(updated.owner_id, alice);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let pool = make_pool().await;
        let alice = seed_user(&pool, "alice@example.com").await;
        let s = TaskStorage::new(pool);
        let t = s.create(&alice, &fields("Gone")).await.unwrap();

        assert!(s.delete(&t.id).await.unwrap());
        assert!(s.get(&t.id).await.unwrap().is_none());
        // Second delete finds nothing.
        assert!(!s.delete(&t.id).await.unwrap());
    }
}
