use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::session::{SessionRecord, SessionStore};
use crate::AppError;

use super::millis_to_datetime;

/// SQLite-backed session storage. One row per session in `user_sessions`,
/// timestamps as epoch milliseconds.
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SessionRow {
    session_id: String,
    user_id: i64,
    session_start: i64,
    session_end: i64,
}

impl SessionRow {
    fn into_record(self) -> Result<SessionRecord, AppError> {
        Ok(SessionRecord {
            session_id: self.session_id,
            user_id: self.user_id,
            session_start: millis_to_datetime(self.session_start)?,
            session_end: millis_to_datetime(self.session_end)?,
        })
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, AppError> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT session_id, user_id, session_start, session_end FROM user_sessions WHERE session_id = ?"
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "bookshelf", "msg=\"database error\" operation=\"session_get\" error=\"{e}\"");
            AppError::DatabaseError(e.to_string())
        })?;

        row.map(SessionRow::into_record).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn insert(&self, record: SessionRecord) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO user_sessions (session_id, user_id, session_start, session_end) VALUES (?, ?, ?, ?)"
        )
        .bind(&record.session_id)
        .bind(record.user_id)
        .bind(record.session_start.timestamp_millis())
        .bind(record.session_end.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "bookshelf", "msg=\"database error\" operation=\"session_insert\" error=\"{e}\"");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn update_expiry(
        &self,
        session_id: &str,
        new_end: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE user_sessions SET session_end = ? WHERE session_id = ?")
            .bind(new_end.timestamp_millis())
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!(target: "bookshelf", "msg=\"database error\" operation=\"session_update_expiry\" error=\"{e}\"");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::SessionNotFound);
        }

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE session_end < ?")
            .bind(cutoff.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!(target: "bookshelf", "msg=\"database error\" operation=\"session_sweep\" error=\"{e}\"");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::{migrations, SqliteUserRepository};
    use crate::UserRepository;
    use chrono::Duration;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> (SqliteSessionStore, i64) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrations::run(&pool).await.unwrap();

        let users = SqliteUserRepository::new(pool.clone());
        let user = users.create_user("alice", "Alice", "hash").await.unwrap();

        (SqliteSessionStore::new(pool), user.id)
    }

    fn record(session_id: &str, user_id: i64, end_offset: Duration) -> SessionRecord {
        let now = Utc::now();
        SessionRecord {
            session_id: session_id.to_owned(),
            user_id,
            session_start: now,
            session_end: now + end_offset,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let (store, user_id) = setup().await;
        let record = record("s1", user_id, Duration::hours(2));

        store.insert(record.clone()).await.unwrap();

        let found = store.get("s1").await.unwrap().unwrap();
        assert_eq!(found.session_id, record.session_id);
        assert_eq!(found.user_id, user_id);
        // Millisecond precision survives the INTEGER column
        assert_eq!(
            found.session_end.timestamp_millis(),
            record.session_end.timestamp_millis()
        );
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let (store, _) = setup().await;
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_expiry_zero_rows() {
        let (store, _) = setup().await;

        let result = store.update_expiry("missing", Utc::now()).await;
        assert_eq!(result, Err(AppError::SessionNotFound));
    }

    #[tokio::test]
    async fn test_sweep_deletes_expired_only() {
        let (store, user_id) = setup().await;

        store
            .insert(record("expired", user_id, -Duration::hours(1)))
            .await
            .unwrap();
        store
            .insert(record("live", user_id, Duration::hours(1)))
            .await
            .unwrap();

        assert_eq!(store.delete_expired_before(Utc::now()).await.unwrap(), 1);
        assert!(store.get("expired").await.unwrap().is_none());
        assert!(store.get("live").await.unwrap().is_some());
        assert_eq!(store.delete_expired_before(Utc::now()).await.unwrap(), 0);
    }
}
