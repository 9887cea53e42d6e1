//! Credential verification against the user table.

use serde::Serialize;

use crate::crypto::PasswordHasher;
use crate::repository::UserRepository;
use crate::AppError;

/// An authenticated identity. The stored password hash never crosses this
/// boundary.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: i64,
    pub login: String,
    pub name: String,
}

#[derive(Clone)]
pub struct CredentialVerifier<U, H> {
    users: U,
    hasher: H,
}

impl<U, H> CredentialVerifier<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    pub fn new(users: U, hasher: H) -> Self {
        CredentialVerifier { users, hasher }
    }

    /// Validates a login/password pair and yields the matching identity.
    ///
    /// # Errors
    ///
    /// - `AppError::MissingInput` - login or password empty
    /// - `AppError::UserNotFound` - no user row matches the login
    /// - `AppError::InvalidCredentials` - stored hash does not match
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    pub async fn verify(&self, login: &str, password: &str) -> Result<Identity, AppError> {
        if login.is_empty() {
            return Err(AppError::MissingInput("login".to_owned()));
        }
        if password.is_empty() {
            return Err(AppError::MissingInput("password".to_owned()));
        }

        let user = self
            .users
            .find_user_by_login(login)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !self.hasher.verify(password, &user.password_hash)? {
            log::warn!(target: "bookshelf::auth", "msg=\"login failed\" login=\"{login}\"");
            return Err(AppError::InvalidCredentials);
        }

        Ok(Identity {
            id: user.id,
            login: user.login,
            name: user.name,
        })
    }
}
