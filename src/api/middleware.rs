//! Session authentication gate.
//!
//! Every route except login demands a [`CurrentSession`]; extracting one
//! runs the full gate: cookie present, signature intact, session resolved,
//! still valid, then prolonged (sliding expiration). CORS pre-flight
//! requests are answered by the CORS layer and never reach a handler.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use super::error::ApiError;
use super::routes::AppState;
use crate::crypto::PasswordHasher;
use crate::repository::{BookRepository, UserRepository};
use crate::session::{verify_signed_cookie, SessionContext, SessionStore};
use crate::AppError;

/// The resolved session context attached to an authenticated request.
///
/// Computed fresh for every request; never cached across requests.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionContext);

impl CurrentSession {
    pub fn user_id(&self) -> i64 {
        self.0.user_id
    }

    pub fn session_id(&self) -> &str {
        &self.0.session_id
    }

    pub fn context(&self) -> &SessionContext {
        &self.0
    }

    pub fn into_inner(self) -> SessionContext {
        self.0
    }
}

/// A session row vanishing mid-request (a concurrent sweep won the race)
/// is an authentication failure, not a server fault.
fn unauthenticated_if_missing(err: AppError) -> ApiError {
    match err {
        AppError::SessionNotFound => ApiError(AppError::Unauthenticated),
        other => ApiError(other),
    }
}

impl<U, S, B, H> FromRequestParts<AppState<U, S, B, H>> for CurrentSession
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    B: BookRepository + Clone + Send + Sync + 'static,
    H: PasswordHasher + Clone + Send + Sync + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<U, S, B, H>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let cookie = jar
            .get(&state.session_config.cookie_name)
            .ok_or(ApiError(AppError::Unauthenticated))?;

        let session_id = verify_signed_cookie(cookie.value(), &state.session_config.secret_key)
            .ok_or(ApiError(AppError::Unauthenticated))?;

        let context = state
            .sessions
            .resolve(&session_id)
            .await
            .map_err(unauthenticated_if_missing)?;

        // Expired sessions are rejected, never deleted here; the sweep owns
        // deletion.
        if !context.is_valid {
            return Err(ApiError(AppError::Unauthenticated));
        }

        state
            .sessions
            .prolong(&session_id)
            .await
            .map_err(unauthenticated_if_missing)?;

        Ok(CurrentSession(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_session_maps_to_unauthenticated() {
        let mapped = unauthenticated_if_missing(AppError::SessionNotFound);
        assert_eq!(mapped.0, AppError::Unauthenticated);
    }

    #[test]
    fn test_other_errors_pass_through() {
        let mapped = unauthenticated_if_missing(AppError::DatabaseError("boom".to_owned()));
        assert_eq!(mapped.0, AppError::DatabaseError("boom".to_owned()));
    }
}
