pub mod api;
pub mod config;
pub mod crypto;
pub mod repository;
pub mod session;
pub mod sqlite;
pub mod verifier;

pub use config::AppConfig;
pub use crypto::SecretString;
pub use repository::{Book, BookDraft, BookRepository, User, UserRepository};
pub use repository::{MockBookRepository, MockUserRepository};
pub use session::{InMemorySessionStore, SessionManager, SessionStore};
pub use verifier::{CredentialVerifier, Identity};

use std::fmt;

/// Error taxonomy for the whole backend.
///
/// Every store or verifier failure is translated into one of these kinds at
/// the nearest boundary; raw I/O errors never reach the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// A required input field was empty or absent. Carries the field name.
    MissingInput(String),
    /// Login exists but the password hash does not match.
    InvalidCredentials,
    UserNotFound,
    SessionNotFound,
    BookNotFound,
    /// Absent, unknown, tampered or expired session.
    Unauthenticated,
    /// Session user does not match the resource owner.
    Forbidden,
    DatabaseError(String),
    Internal(String),
}

impl std::error::Error for AppError {}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingInput(field) => write!(f, "{field} is required"),
            AppError::InvalidCredentials => write!(f, "incorrect password"),
            AppError::UserNotFound => write!(f, "user not found"),
            AppError::SessionNotFound => write!(f, "session not found"),
            AppError::BookNotFound => write!(f, "book not found"),
            AppError::Unauthenticated => write!(f, "authentication required"),
            AppError::Forbidden => write!(f, "forbidden for current session user"),
            AppError::DatabaseError(msg) => write!(f, "database error: {msg}"),
            AppError::Internal(msg) => write!(f, "{msg}"),
        }
    }
}
