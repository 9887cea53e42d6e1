#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};

use crate::AppError;

use super::book::{Book, BookDraft, BookRepository};

/// In-memory book repository for tests and the development server.
///
/// Books are stored per owner; one entry per (user, book) binding, matching
/// how the SQLite backend joins `books` with `user_books`.
#[derive(Clone, Default)]
pub struct MockBookRepository {
    books: Arc<Mutex<Vec<(i64, Book)>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn book_from_draft(id: i64, draft: &BookDraft) -> Book {
    let now = Utc::now();
    Book {
        id,
        title: draft.title.clone().unwrap_or_default(),
        title_orig: draft.title_orig.clone(),
        author: draft.author.clone().unwrap_or_default(),
        author_orig: draft.author_orig.clone(),
        publication_year: draft.publication_year.unwrap_or_default(),
        cover_image_link: draft.cover_image_link.clone(),
        annotation: draft.annotation.clone(),
        read_status: draft.read_status.clone(),
        assessment: draft.assessment,
        comment: draft.comment.clone(),
        inserted_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl BookRepository for MockBookRepository {
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Book>, AppError> {
        let books = self.books.lock().unwrap();
        Ok(books
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, book)| book.clone())
            .collect())
    }

    async fn get_for_user(&self, user_id: i64, book_id: i64) -> Result<Option<Book>, AppError> {
        let books = self.books.lock().unwrap();
        Ok(books
            .iter()
            .find(|(owner, book)| *owner == user_id && book.id == book_id)
            .map(|(_, book)| book.clone()))
    }

    async fn create_for_user(&self, user_id: i64, draft: &BookDraft) -> Result<i64, AppError> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let id = *next_id;
        drop(next_id);

        self.books
            .lock()
            .unwrap()
            .push((user_id, book_from_draft(id, draft)));

        Ok(id)
    }

    async fn update_for_user(
        &self,
        user_id: i64,
        book_id: i64,
        draft: &BookDraft,
    ) -> Result<(), AppError> {
        let mut books = self.books.lock().unwrap();
        match books
            .iter_mut()
            .find(|(owner, book)| *owner == user_id && book.id == book_id)
        {
            Some((_, book)) => {
                let inserted_at = book.inserted_at;
                *book = book_from_draft(book_id, draft);
                book.inserted_at = inserted_at;
                Ok(())
            }
            None => Err(AppError::BookNotFound),
        }
    }

    async fn delete_for_user(&self, user_id: i64, book_id: i64) -> Result<(), AppError> {
        let mut books = self.books.lock().unwrap();
        let len_before = books.len();
        books.retain(|(owner, book)| !(*owner == user_id && book.id == book_id));
        if books.len() < len_before {
            Ok(())
        } else {
            Err(AppError::BookNotFound)
        }
    }
}
