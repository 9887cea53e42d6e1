mod config;
mod cookie;
mod manager;
mod memory_store;
mod store;

use chrono::{DateTime, Utc};
pub use config::{SameSite, SessionConfig};
pub use cookie::{sign_session_id, verify_signed_cookie};
pub use manager::{SessionManager, SESSION_ID_LENGTH};
pub use memory_store::InMemorySessionStore;
use serde::Serialize;
pub use store::SessionStore;

/// A persisted session row.
///
/// `session_end` is set at creation and never null; whether the session is
/// valid is always derived from it at the instant of evaluation, never
/// stored as a flag.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_id: i64,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_valid(&self) -> bool {
        Utc::now() < self.session_end
    }
}

/// Session metadata resolved for one request, joined with the owning user.
///
/// Computed fresh on every lookup; never cached across requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub user_id: i64,
    pub user_login: String,
    pub user_name: String,
    pub session_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub session_start: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub session_end: DateTime<Utc>,
    pub is_valid: bool,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn record(end_offset: Duration) -> SessionRecord {
        SessionRecord {
            session_id: "session123".to_owned(),
            user_id: 1,
            session_start: Utc::now() - Duration::hours(1),
            session_end: Utc::now() + end_offset,
        }
    }

    #[test]
    fn test_record_valid_before_end() {
        assert!(record(Duration::hours(1)).is_valid());
    }

    #[test]
    fn test_record_invalid_after_end() {
        assert!(!record(-Duration::hours(1)).is_valid());
    }

    #[test]
    fn test_context_serializes_millis_and_camel_case() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let context = SessionContext {
            user_id: 7,
            user_login: "alice".to_owned(),
            user_name: "Alice".to_owned(),
            session_id: "abc".to_owned(),
            session_start: now,
            session_end: now,
            is_valid: true,
        };

        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(value["userId"], 7);
        assert_eq!(value["userLogin"], "alice");
        assert_eq!(value["sessionStart"], 1_700_000_000_000_i64);
        assert_eq!(value["isValid"], true);
    }
}
