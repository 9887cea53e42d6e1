use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, SqlitePool};

use crate::{AppError, Book, BookDraft, BookRepository};

use super::millis_to_datetime;

/// SQLite-backed book storage: the shared `books` table plus the
/// `user_books` binding table carrying per-user shelf fields.
#[derive(Clone)]
pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SELECT_USER_BOOK: &str = "SELECT
        b.id, b.title, b.title_orig, b.author, b.author_orig,
        b.publication_year, b.cover_image_link, b.annotation,
        ub.read_status, ub.assessment, ub.comment, ub.inserted_at, ub.updated_at
    FROM books b
    JOIN user_books ub ON ub.book_id = b.id
    WHERE ub.user_id = ?";

#[derive(FromRow)]
struct BookRow {
    id: i64,
    title: String,
    title_orig: Option<String>,
    author: String,
    author_orig: Option<String>,
    publication_year: i32,
    cover_image_link: Option<String>,
    annotation: Option<String>,
    read_status: Option<String>,
    assessment: Option<i32>,
    comment: Option<String>,
    inserted_at: i64,
    updated_at: i64,
}

impl BookRow {
    fn into_book(self) -> Result<Book, AppError> {
        Ok(Book {
            id: self.id,
            title: self.title,
            title_orig: self.title_orig,
            author: self.author,
            author_orig: self.author_orig,
            publication_year: self.publication_year,
            cover_image_link: self.cover_image_link,
            annotation: self.annotation,
            read_status: self.read_status,
            assessment: self.assessment,
            comment: self.comment,
            inserted_at: millis_to_datetime(self.inserted_at)?,
            updated_at: millis_to_datetime(self.updated_at)?,
        })
    }
}

fn db_error(operation: &str, e: sqlx::Error) -> AppError {
    log::error!(target: "bookshelf", "msg=\"database error\" operation=\"{operation}\" error=\"{e}\"");
    AppError::DatabaseError(e.to_string())
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Book>, AppError> {
        let rows: Vec<BookRow> = sqlx::query_as(SELECT_USER_BOOK)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("book_list", e))?;

        rows.into_iter().map(BookRow::into_book).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn get_for_user(&self, user_id: i64, book_id: i64) -> Result<Option<Book>, AppError> {
        let row: Option<BookRow> = sqlx::query_as(&format!("{SELECT_USER_BOOK} AND b.id = ?"))
            .bind(user_id)
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("book_get", e))?;

        row.map(BookRow::into_book).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, draft), err))]
    async fn create_for_user(&self, user_id: i64, draft: &BookDraft) -> Result<i64, AppError> {
        let book_id: i64 = sqlx::query_scalar(
            "INSERT INTO books (title, title_orig, author, author_orig, publication_year, cover_image_link, annotation)
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(draft.title.clone().unwrap_or_default())
        .bind(&draft.title_orig)
        .bind(draft.author.clone().unwrap_or_default())
        .bind(&draft.author_orig)
        .bind(draft.publication_year.unwrap_or_default())
        .bind(&draft.cover_image_link)
        .bind(&draft.annotation)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("book_create", e))?;

        let now = Utc::now().timestamp_millis();
        sqlx::query(
            "INSERT INTO user_books (user_id, book_id, read_status, assessment, comment, inserted_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(book_id)
        .bind(&draft.read_status)
        .bind(draft.assessment)
        .bind(&draft.comment)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("book_bind", e))?;

        Ok(book_id)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, draft), err))]
    async fn update_for_user(
        &self,
        user_id: i64,
        book_id: i64,
        draft: &BookDraft,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE user_books SET read_status = ?, assessment = ?, comment = ?, updated_at = ?
             WHERE user_id = ? AND book_id = ?",
        )
        .bind(&draft.read_status)
        .bind(draft.assessment)
        .bind(&draft.comment)
        .bind(Utc::now().timestamp_millis())
        .bind(user_id)
        .bind(book_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("book_update_binding", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::BookNotFound);
        }

        sqlx::query(
            "UPDATE books SET title = ?, title_orig = ?, author = ?, author_orig = ?,
             publication_year = ?, cover_image_link = ?, annotation = ? WHERE id = ?",
        )
        .bind(draft.title.clone().unwrap_or_default())
        .bind(&draft.title_orig)
        .bind(draft.author.clone().unwrap_or_default())
        .bind(&draft.author_orig)
        .bind(draft.publication_year.unwrap_or_default())
        .bind(&draft.cover_image_link)
        .bind(&draft.annotation)
        .bind(book_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("book_update", e))?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete_for_user(&self, user_id: i64, book_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM user_books WHERE user_id = ? AND book_id = ?")
            .bind(user_id)
            .bind(book_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("book_unbind", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::BookNotFound);
        }

        sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(book_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("book_delete", e))?;

        Ok(())
    }
}
