use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;

/// The slice of a user profile this subsystem cares about.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: String,
    pub ai_enabled: bool,
}

/// User entitlement lookup. The rest of the account model lives elsewhere.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, user_id: &str) -> eyre::Result<Option<UserProfile>>;
}

/// Directory backed by the shared PostgreSQL users table.
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn get_user(&self, user_id: &str) -> eyre::Result<Option<UserProfile>> {
        let row: Option<(bool,)> =
            sqlx::query_as("SELECT ai_enabled FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(ai_enabled,)| UserProfile {
            id: user_id.to_string(),
            ai_enabled,
        }))
    }
}

/// Fixed in-memory directory for tests and local fixtures.
#[derive(Default)]
pub struct StaticUserDirectory {
    users: HashMap<String, bool>,
}

impl StaticUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: &str, ai_enabled: bool) -> Self {
        self.users.insert(user_id.to_string(), ai_enabled);
        self
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn get_user(&self, user_id: &str) -> eyre::Result<Option<UserProfile>> {
        Ok(self.users.get(user_id).map(|&ai_enabled| UserProfile {
            id: user_id.to_string(),
            ai_enabled,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_directory_lookup() {
        let directory = StaticUserDirectory::new()
            .with_user("user-1", true)
            .with_user("user-2", false);

        let enabled = directory.get_user("user-1").await.unwrap().unwrap();
        assert!(enabled.ai_enabled);

        let disabled = directory.get_user("user-2").await.unwrap().unwrap();
        assert!(!disabled.ai_enabled);

        assert!(directory.get_user("user-3").await.unwrap().is_none());
    }
}
