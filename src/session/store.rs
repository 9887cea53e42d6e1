//! Session store trait.

use crate::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::SessionRecord;

/// Durable keyed storage of session records.
///
/// Implementations provide different storage backends:
/// - [`InMemorySessionStore`](super::InMemorySessionStore): in-memory storage
///   for development and tests
/// - [`SqliteSessionStore`](crate::sqlite::SqliteSessionStore): SQLite storage
///
/// All operations are single-row or predicate-filtered and atomic with
/// respect to concurrent calls on the same key. A missing row is `Ok(None)`
/// from [`get`](SessionStore::get), never a default record: callers must be
/// able to tell "no row" apart from "row present but expired."
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetches a session record by its ID.
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, AppError>;

    /// Inserts a freshly created session record.
    async fn insert(&self, record: SessionRecord) -> Result<(), AppError>;

    /// Replaces a session's expiry time.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SessionNotFound` when no row was affected.
    async fn update_expiry(
        &self,
        session_id: &str,
        new_end: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Deletes every session whose expiry lies before `cutoff`.
    ///
    /// Returns the number of sessions removed.
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}
