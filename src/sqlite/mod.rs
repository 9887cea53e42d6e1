pub mod migrations;

mod book;
mod session;
mod user;

pub use book::SqliteBookRepository;
pub use session::SqliteSessionStore;
pub use user::SqliteUserRepository;

use chrono::{DateTime, Utc};

use crate::AppError;

/// Session and binding timestamps are persisted as epoch milliseconds
/// (INTEGER columns), so decoding goes through this helper rather than
/// sqlx's chrono support, which expects seconds.
pub(crate) fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| AppError::DatabaseError(format!("timestamp out of range: {ms}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_roundtrip() {
        let now = Utc::now();
        let decoded = millis_to_datetime(now.timestamp_millis()).unwrap();
        assert_eq!(decoded.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn test_millis_out_of_range() {
        assert!(millis_to_datetime(i64::MAX).is_err());
    }
}
