// SPDX-License-Identifier: MIT
//! User SQLite operations.

use anyhow::Result;
use sqlx::SqlitePool;

use super::model::{new_id, Role, User};
use crate::storage::unixepoch;

pub struct UserStorage {
    pub(crate) pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user. `password_hash` must already be an argon2 PHC
    /// string — plaintext never reaches this layer.
    pub async fn create(&self, email: &str, password_hash: &str, role: Role) -> Result<User> {
        let id = new_id();
        let now = unixepoch();
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, is_active, role, created_at) \
             VALUES (?, ?, ?, 1, ?, ?)",
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(role.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;
        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user not found after insert"))
    }

    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    async fn make_storage() -> UserStorage {
        let storage = Storage::new_in_memory().await.unwrap();
        UserStorage::new(storage.pool())
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let s = make_storage().await;
        let u = s
            .create("alice@example.com", "$argon2id$stub", Role::User)
            .await
            .unwrap();
        assert_eq!(u.email, "alice@example.com");
        assert_eq!(u.role(), Role::User);
        assert!(u.is_active);

        let fetched = s.get(&u.id).await.unwrap().expect("should exist");
        assert_eq!(fetched.id, u.id);
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let s = make_storage().await;
        s.create("bob@example.com", "$argon2id$stub", Role::Admin)
            .await
            .unwrap();
        let found = s.find_by_email("bob@example.com").await.unwrap().unwrap();
        assert_eq!(found.role(), Role::Admin);
        assert!(s.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let s = make_storage().await;
        s.create("dup@example.com", "$argon2id$stub", Role::User)
            .await
            .unwrap();
        let second = s.create("dup@example.com", "$argon2id$stub", Role::User).await;
        assert!(second.is_err());
    }
}
