//! Session lifecycle: creation, resolution, prolongation, closure, sweep.

use chrono::{Duration, Utc};

use crate::crypto::generate_token;
use crate::repository::UserRepository;
use crate::AppError;

use super::store::SessionStore;
use super::{SessionContext, SessionRecord};

/// Length of generated session identifiers, in alphanumeric characters.
pub const SESSION_ID_LENGTH: usize = 64;

/// Owns the session lifecycle. The only component that mutates session rows.
///
/// Holds its store and user-repository dependencies explicitly; construct one
/// per application and hand it to the request layer by clone.
#[derive(Clone)]
pub struct SessionManager<S, U> {
    store: S,
    users: U,
    lifetime: Duration,
}

impl<S, U> SessionManager<S, U>
where
    S: SessionStore,
    U: UserRepository,
{
    pub fn new(store: S, users: U, lifetime: Duration) -> Self {
        Self {
            store,
            users,
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Starts a new session for the given user and returns its ID.
    ///
    /// One row per login; a fresh random token every time.
    ///
    /// # Errors
    ///
    /// Returns `AppError::MissingInput` if `user_login` is empty.
    pub async fn create(&self, user_id: i64, user_login: &str) -> Result<String, AppError> {
        if user_login.trim().is_empty() {
            return Err(AppError::MissingInput("userLogin".to_owned()));
        }

        let session_id = generate_token(SESSION_ID_LENGTH);
        let now = Utc::now();

        self.store
            .insert(SessionRecord {
                session_id: session_id.clone(),
                user_id,
                session_start: now,
                session_end: now + self.lifetime,
            })
            .await?;

        log::info!(target: "bookshelf::session", "msg=\"session started\" user_id={user_id}");

        Ok(session_id)
    }

    /// Looks up a session and joins the owning user into a [`SessionContext`].
    ///
    /// The context is returned whether or not the session is still valid;
    /// `is_valid` is computed at this instant and callers decide how to react
    /// to an expired session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SessionNotFound` if the row is absent or the owning
    /// user no longer exists.
    pub async fn resolve(&self, session_id: &str) -> Result<SessionContext, AppError> {
        let record = self
            .store
            .get(session_id)
            .await?
            .ok_or(AppError::SessionNotFound)?;

        let user = self
            .users
            .find_user_by_id(record.user_id)
            .await?
            .ok_or(AppError::SessionNotFound)?;

        Ok(SessionContext {
            is_valid: record.is_valid(),
            user_id: record.user_id,
            user_login: user.login,
            user_name: user.name,
            session_id: record.session_id,
            session_start: record.session_start,
            session_end: record.session_end,
        })
    }

    /// Pushes the session's expiry to `now + lifetime` (sliding expiration).
    ///
    /// Validity is not checked here; the caller gates prolongation behind a
    /// validity check.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SessionNotFound` if no row was affected.
    pub async fn prolong(&self, session_id: &str) -> Result<(), AppError> {
        self.store
            .update_expiry(session_id, Utc::now() + self.lifetime)
            .await
    }

    /// Ends a session immediately by setting its expiry to `now`.
    ///
    /// The row survives until the next sweep. Closing an already-closed
    /// session succeeds.
    pub async fn close(&self, session_id: &str) -> Result<(), AppError> {
        self.store.update_expiry(session_id, Utc::now()).await?;

        log::info!(target: "bookshelf::session", "msg=\"session closed\"");

        Ok(())
    }

    /// Deletes every session whose expiry has passed.
    ///
    /// Invoked after each successful login; best-effort lazy cleanup, not a
    /// promptness guarantee.
    pub async fn sweep_expired(&self) -> Result<u64, AppError> {
        let removed = self.store.delete_expired_before(Utc::now()).await?;

        if removed > 0 {
            log::info!(target: "bookshelf::session", "msg=\"expired sessions removed\" count={removed}");
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use crate::session::InMemorySessionStore;

    fn manager() -> (
        SessionManager<InMemorySessionStore, MockUserRepository>,
        InMemorySessionStore,
        MockUserRepository,
    ) {
        let store = InMemorySessionStore::new();
        let users = MockUserRepository::new();
        let manager = SessionManager::new(store.clone(), users.clone(), Duration::hours(24));
        (manager, store, users)
    }

    #[tokio::test]
    async fn test_create_then_resolve_is_valid() {
        let (manager, _, users) = manager();
        let user = users.seed("alice", "Alice", "hash");

        let session_id = manager.create(user.id, &user.login).await.unwrap();
        assert_eq!(session_id.len(), SESSION_ID_LENGTH);

        let context = manager.resolve(&session_id).await.unwrap();
        assert!(context.is_valid);
        assert_eq!(context.user_id, user.id);
        assert_eq!(context.user_login, "alice");
        assert_eq!(context.user_name, "Alice");
        assert_eq!(context.session_end - context.session_start, Duration::hours(24));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_login() {
        let (manager, _, _) = manager();

        let result = manager.create(1, "").await;
        assert_eq!(result, Err(AppError::MissingInput("userLogin".to_owned())));
    }

    #[tokio::test]
    async fn test_create_generates_distinct_tokens() {
        let (manager, _, users) = manager();
        let user = users.seed("alice", "Alice", "hash");

        let first = manager.create(user.id, &user.login).await.unwrap();
        let second = manager.create(user.id, &user.login).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_resolve_unknown_session() {
        let (manager, _, _) = manager();

        let result = manager.resolve("unknown").await;
        assert!(matches!(result, Err(AppError::SessionNotFound)));
    }

    #[tokio::test]
    async fn test_resolve_session_of_deleted_user() {
        let (manager, store, _) = manager();

        // Row exists but no user owns it anymore
        store
            .insert(SessionRecord {
                session_id: "orphan".to_owned(),
                user_id: 99,
                session_start: Utc::now(),
                session_end: Utc::now() + Duration::hours(1),
            })
            .await
            .unwrap();

        let result = manager.resolve("orphan").await;
        assert!(matches!(result, Err(AppError::SessionNotFound)));
    }

    #[tokio::test]
    async fn test_close_then_resolve_invalid_but_present() {
        let (manager, _, users) = manager();
        let user = users.seed("alice", "Alice", "hash");

        let session_id = manager.create(user.id, &user.login).await.unwrap();
        manager.close(&session_id).await.unwrap();

        let context = manager.resolve(&session_id).await.unwrap();
        assert!(!context.is_valid);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (manager, _, users) = manager();
        let user = users.seed("alice", "Alice", "hash");

        let session_id = manager.create(user.id, &user.login).await.unwrap();
        manager.close(&session_id).await.unwrap();
        manager.close(&session_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_prolong_extends_expired_session() {
        let (manager, store, users) = manager();
        let user = users.seed("alice", "Alice", "hash");

        let session_id = manager.create(user.id, &user.login).await.unwrap();

        // Force the session into the past
        store
            .update_expiry(&session_id, Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        assert!(!manager.resolve(&session_id).await.unwrap().is_valid);

        // Prolong does not check validity; it always extends from now
        manager.prolong(&session_id).await.unwrap();

        let context = manager.resolve(&session_id).await.unwrap();
        assert!(context.is_valid);
        assert!(context.session_end > Utc::now() + Duration::hours(23));
    }

    #[tokio::test]
    async fn test_prolong_unknown_session() {
        let (manager, _, _) = manager();

        let result = manager.prolong("unknown").await;
        assert_eq!(result, Err(AppError::SessionNotFound));
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let (manager, store, users) = manager();
        let alice = users.seed("alice", "Alice", "hash");
        let bob = users.seed("bob", "Bob", "hash");

        let expired = manager.create(alice.id, &alice.login).await.unwrap();
        let live = manager.create(bob.id, &bob.login).await.unwrap();

        store
            .update_expiry(&expired, Utc::now() - Duration::seconds(1))
            .await
            .unwrap();

        assert_eq!(manager.sweep_expired().await.unwrap(), 1);
        assert!(matches!(
            manager.resolve(&expired).await,
            Err(AppError::SessionNotFound)
        ));
        assert!(manager.resolve(&live).await.unwrap().is_valid);

        // Second run removes nothing
        assert_eq!(manager.sweep_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_sessions_are_swept_eventually() {
        let (manager, _, users) = manager();
        let user = users.seed("alice", "Alice", "hash");

        let session_id = manager.create(user.id, &user.login).await.unwrap();
        manager.close(&session_id).await.unwrap();

        // close() set session_end = now; a sweep strictly after that removes it
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert_eq!(manager.sweep_expired().await.unwrap(), 1);
    }
}
