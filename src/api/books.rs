//! Book CRUD handlers.
//!
//! All routes sit behind the session gate and consume only the resolved
//! user ID from the session context: the path user must match the session
//! user, otherwise the request is `Forbidden`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::error::ApiError;
use super::middleware::CurrentSession;
use super::routes::AppState;
use super::types::{CreatedBookResponse, MessageResponse};
use crate::crypto::PasswordHasher;
use crate::repository::{Book, BookDraft, BookRepository, UserRepository};
use crate::session::SessionStore;
use crate::AppError;

fn ensure_owner(session: &CurrentSession, user_id: i64) -> Result<(), ApiError> {
    if session.user_id() != user_id {
        return Err(ApiError(AppError::Forbidden));
    }
    Ok(())
}

/// `GET /users/{user_id}/books`
pub async fn list<U, S, B, H>(
    State(state): State<AppState<U, S, B, H>>,
    session: CurrentSession,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Book>>, ApiError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    B: BookRepository + Clone + Send + Sync + 'static,
    H: PasswordHasher + Clone + Send + Sync + 'static,
{
    ensure_owner(&session, user_id)?;

    let books = state.books.list_for_user(user_id).await?;
    Ok(Json(books))
}

/// `GET /users/{user_id}/books/{book_id}`
pub async fn get_one<U, S, B, H>(
    State(state): State<AppState<U, S, B, H>>,
    session: CurrentSession,
    Path((user_id, book_id)): Path<(i64, i64)>,
) -> Result<Json<Book>, ApiError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    B: BookRepository + Clone + Send + Sync + 'static,
    H: PasswordHasher + Clone + Send + Sync + 'static,
{
    ensure_owner(&session, user_id)?;

    let book = state
        .books
        .get_for_user(user_id, book_id)
        .await?
        .ok_or(ApiError(AppError::BookNotFound))?;

    Ok(Json(book))
}

/// `POST /users/{user_id}/books`
pub async fn create<U, S, B, H>(
    State(state): State<AppState<U, S, B, H>>,
    session: CurrentSession,
    Path(user_id): Path<i64>,
    Json(draft): Json<BookDraft>,
) -> Result<(StatusCode, Json<CreatedBookResponse>), ApiError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    B: BookRepository + Clone + Send + Sync + 'static,
    H: PasswordHasher + Clone + Send + Sync + 'static,
{
    ensure_owner(&session, user_id)?;
    draft.validate()?;

    let book_id = state.books.create_for_user(user_id, &draft).await?;

    Ok((StatusCode::CREATED, Json(CreatedBookResponse { book_id })))
}

/// `PUT /users/{user_id}/books/{book_id}`
pub async fn update<U, S, B, H>(
    State(state): State<AppState<U, S, B, H>>,
    session: CurrentSession,
    Path((user_id, book_id)): Path<(i64, i64)>,
    Json(draft): Json<BookDraft>,
) -> Result<Json<MessageResponse>, ApiError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    B: BookRepository + Clone + Send + Sync + 'static,
    H: PasswordHasher + Clone + Send + Sync + 'static,
{
    ensure_owner(&session, user_id)?;
    draft.validate()?;

    state.books.update_for_user(user_id, book_id, &draft).await?;

    Ok(Json(MessageResponse {
        message: "book updated".to_owned(),
    }))
}

/// `DELETE /users/{user_id}/books/{book_id}`
pub async fn delete<U, S, B, H>(
    State(state): State<AppState<U, S, B, H>>,
    session: CurrentSession,
    Path((user_id, book_id)): Path<(i64, i64)>,
) -> Result<Json<MessageResponse>, ApiError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    B: BookRepository + Clone + Send + Sync + 'static,
    H: PasswordHasher + Clone + Send + Sync + 'static,
{
    ensure_owner(&session, user_id)?;

    state.books.delete_for_user(user_id, book_id).await?;

    Ok(Json(MessageResponse {
        message: "book deleted".to_owned(),
    }))
}
