use axum::routing::{get, post};
use axum::Router;

use super::{books, handlers};
use crate::crypto::PasswordHasher;
use crate::repository::{BookRepository, UserRepository};
use crate::session::{SessionConfig, SessionStore};
use crate::{CredentialVerifier, SessionManager};

/// Shared application state: explicitly constructed components, handed to the
/// request layer by clone. No ambient globals.
#[derive(Clone)]
pub struct AppState<U, S, B, H> {
    pub sessions: SessionManager<S, U>,
    pub verifier: CredentialVerifier<U, H>,
    pub books: B,
    pub session_config: SessionConfig,
}

/// Authentication routes: login is the only route outside the gate.
pub fn auth_routes<U, S, B, H>() -> Router<AppState<U, S, B, H>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    B: BookRepository + Clone + Send + Sync + 'static,
    H: PasswordHasher + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/session", get(handlers::session_info))
        .route("/login", post(handlers::login::<U, S, B, H>))
        .route("/logout", post(handlers::logout::<U, S, B, H>))
}

/// Per-user book routes, all behind the gate.
pub fn book_routes<U, S, B, H>() -> Router<AppState<U, S, B, H>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    B: BookRepository + Clone + Send + Sync + 'static,
    H: PasswordHasher + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/{user_id}/books",
            get(books::list::<U, S, B, H>).post(books::create::<U, S, B, H>),
        )
        .route(
            "/{user_id}/books/{book_id}",
            get(books::get_one::<U, S, B, H>)
                .put(books::update::<U, S, B, H>)
                .delete(books::delete::<U, S, B, H>),
        )
}

/// Assembles the full application router.
pub fn router<U, S, B, H>(state: AppState<U, S, B, H>) -> Router
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    B: BookRepository + Clone + Send + Sync + 'static,
    H: PasswordHasher + Clone + Send + Sync + 'static,
{
    Router::new()
        .nest("/auth", auth_routes::<U, S, B, H>())
        .nest("/users", book_routes::<U, S, B, H>())
        .with_state(state)
}
