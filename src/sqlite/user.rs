use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

use crate::{AppError, User, UserRepository};

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    login: String,
    name: String,
    password_hash: String,
}

impl From<UserRecord> for User {
    fn from(row: UserRecord) -> Self {
        User {
            id: row.id,
            login: row.login,
            name: row.name,
            password_hash: row.password_hash,
        }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let row: Option<UserRecord> =
            sqlx::query_as("SELECT id, login, name, password_hash FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(target: "bookshelf", "msg=\"database error\" operation=\"find_user_by_id\" error=\"{e}\"");
                    AppError::DatabaseError(e.to_string())
                })?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, login), err))]
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, AppError> {
        let row: Option<UserRecord> =
            sqlx::query_as("SELECT id, login, name, password_hash FROM users WHERE login = ?")
                .bind(login)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(target: "bookshelf", "msg=\"database error\" operation=\"find_user_by_login\" error=\"{e}\"");
                    AppError::DatabaseError(e.to_string())
                })?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, login, name, password_hash), err)
    )]
    async fn create_user(
        &self,
        login: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let row: UserRecord = sqlx::query_as(
            "INSERT INTO users (login, name, password_hash) VALUES (?, ?, ?) RETURNING id, login, name, password_hash"
        )
        .bind(login)
        .bind(name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "bookshelf", "msg=\"database error\" operation=\"create_user\" error=\"{e}\"");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.into())
    }
}
