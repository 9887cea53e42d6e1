use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AppError;

/// A user credential record.
///
/// The authentication core treats this table as an immutable lookup: it reads
/// users to verify credentials and to resolve sessions, and never writes
/// them. `create_user` exists for seeding and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, AppError>;
    async fn create_user(
        &self,
        login: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<User, AppError>;
}
