use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppError;

/// A book on a user's shelf: the shared book record joined with the per-user
/// binding fields (read status, assessment, comment).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub title_orig: Option<String>,
    pub author: String,
    pub author_orig: Option<String>,
    pub publication_year: i32,
    pub cover_image_link: Option<String>,
    pub annotation: Option<String>,
    pub read_status: Option<String>,
    pub assessment: Option<i32>,
    pub comment: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub inserted_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// Incoming book payload for create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    pub title: Option<String>,
    pub title_orig: Option<String>,
    pub author: Option<String>,
    pub author_orig: Option<String>,
    pub publication_year: Option<i32>,
    pub cover_image_link: Option<String>,
    pub annotation: Option<String>,
    pub read_status: Option<String>,
    pub assessment: Option<i32>,
    pub comment: Option<String>,
}

impl BookDraft {
    /// Checks the required fields: title, author, a positive publication year.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.as_deref().unwrap_or("").trim().is_empty() {
            return Err(AppError::MissingInput("title".to_owned()));
        }
        if self.author.as_deref().unwrap_or("").trim().is_empty() {
            return Err(AppError::MissingInput("author".to_owned()));
        }
        match self.publication_year {
            Some(year) if year > 0 => Ok(()),
            _ => Err(AppError::MissingInput("publicationYear".to_owned())),
        }
    }
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Lists every book bound to the user.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Book>, AppError>;

    /// Fetches one of the user's books; `None` if the book is absent or not
    /// bound to this user.
    async fn get_for_user(&self, user_id: i64, book_id: i64) -> Result<Option<Book>, AppError>;

    /// Creates a book and binds it to the user. Returns the new book's ID.
    async fn create_for_user(&self, user_id: i64, draft: &BookDraft) -> Result<i64, AppError>;

    /// Updates a book's shared fields and the user's binding fields.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BookNotFound` if the book is absent or not bound to
    /// this user.
    async fn update_for_user(
        &self,
        user_id: i64,
        book_id: i64,
        draft: &BookDraft,
    ) -> Result<(), AppError>;

    /// Removes a book from the user's shelf and deletes the book record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BookNotFound` if the book is absent or not bound to
    /// this user.
    async fn delete_for_user(&self, user_id: i64, book_id: i64) -> Result<(), AppError>;
}
