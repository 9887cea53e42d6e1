//! In-memory session storage.
//!
//! Suitable for development, testing, and single-instance deployments.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::AppError;

use super::store::SessionStore;
use super::SessionRecord;

/// In-memory session storage.
///
/// Stores sessions in a `HashMap` protected by a `RwLock`, keyed by session
/// ID. Sessions are lost when the process restarts; for persistent storage
/// use [`SqliteSessionStore`](crate::sqlite::SqliteSessionStore).
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of sessions currently stored.
    pub fn len(&self) -> usize {
        self.sessions.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, AppError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| AppError::DatabaseError("lock poisoned".to_owned()))?;

        Ok(sessions.get(session_id).cloned())
    }

    async fn insert(&self, record: SessionRecord) -> Result<(), AppError> {
        self.sessions
            .write()
            .map_err(|_| AppError::DatabaseError("lock poisoned".to_owned()))?
            .insert(record.session_id.clone(), record);

        Ok(())
    }

    async fn update_expiry(
        &self,
        session_id: &str,
        new_end: DateTime<Utc>,
    ) -> Result<(), AppError> {
        match self
            .sessions
            .write()
            .map_err(|_| AppError::DatabaseError("lock poisoned".to_owned()))?
            .get_mut(session_id)
        {
            Some(record) => {
                record.session_end = new_end;
                Ok(())
            }
            None => Err(AppError::SessionNotFound),
        }
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| AppError::DatabaseError("lock poisoned".to_owned()))?;

        let before_count = sessions.len();

        sessions.retain(|_, record| record.session_end >= cutoff);

        let removed = before_count.saturating_sub(sessions.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}
