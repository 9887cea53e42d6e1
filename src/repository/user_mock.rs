#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::AppError;

use super::user::{User, UserRepository};

/// In-memory user repository for tests and the development server.
#[derive(Clone, Default)]
pub struct MockUserRepository {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Inserts a user directly, returning the stored record.
    pub fn seed(&self, login: &str, name: &str, password_hash: &str) -> User {
        let mut users = self.users.lock().unwrap();
        let user = User {
            id: users.len() as i64 + 1,
            login: login.to_owned(),
            name: name.to_owned(),
            password_hash: password_hash.to_owned(),
        };
        users.push(user.clone());
        user
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.login == login).cloned())
    }

    async fn create_user(
        &self,
        login: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        Ok(self.seed(login, name, password_hash))
    }
}
