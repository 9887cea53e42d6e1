//! Authentication handlers: login, logout, session introspection.

use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite as CookieSameSite};
use axum_extra::extract::CookieJar;

use super::error::ApiError;
use super::middleware::CurrentSession;
use super::routes::AppState;
use super::types::{LoginRequest, MessageResponse, UserResponse};
use crate::crypto::PasswordHasher;
use crate::repository::{BookRepository, UserRepository};
use crate::session::{sign_session_id, SessionConfig, SessionContext, SessionStore};

fn build_session_cookie(signed_value: String, config: &SessionConfig) -> Cookie<'static> {
    let same_site = match config.cookie_same_site {
        crate::session::SameSite::None => CookieSameSite::None,
        crate::session::SameSite::Lax => CookieSameSite::Lax,
        crate::session::SameSite::Strict => CookieSameSite::Strict,
    };

    let mut cookie = Cookie::build((config.cookie_name.clone(), signed_value))
        .path(config.cookie_path.clone())
        .secure(config.cookie_secure)
        .http_only(config.cookie_http_only)
        .same_site(same_site)
        .max_age(time::Duration::seconds(config.session_lifetime.num_seconds()))
        .build();

    if let Some(ref domain) = config.cookie_domain {
        cookie.set_domain(domain.clone());
    }

    cookie
}

fn build_removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), String::new()))
        .path(config.cookie_path.clone())
        .max_age(time::Duration::ZERO)
        .build()
}

/// `POST /auth/login`
///
/// Verifies credentials, starts a session, then opportunistically sweeps
/// expired sessions before handing the signed cookie to the client.
pub async fn login<U, S, B, H>(
    State(state): State<AppState<U, S, B, H>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserResponse>), ApiError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    B: BookRepository + Clone + Send + Sync + 'static,
    H: PasswordHasher + Clone + Send + Sync + 'static,
{
    let identity = state.verifier.verify(&body.login, &body.password).await?;

    let session_id = state.sessions.create(identity.id, &identity.login).await?;

    state.sessions.sweep_expired().await?;

    let signed_value = sign_session_id(&session_id, &state.session_config.secret_key);
    let cookie = build_session_cookie(signed_value, &state.session_config);

    log::info!(target: "bookshelf::auth", "msg=\"login success\" user_id={}", identity.id);

    Ok((jar.add(cookie), Json(UserResponse::from(identity))))
}

/// `POST /auth/logout`
///
/// Closes the current session and expires the cookie. The row itself stays
/// until the next sweep.
pub async fn logout<U, S, B, H>(
    State(state): State<AppState<U, S, B, H>>,
    jar: CookieJar,
    session: CurrentSession,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    B: BookRepository + Clone + Send + Sync + 'static,
    H: PasswordHasher + Clone + Send + Sync + 'static,
{
    state.sessions.close(session.session_id()).await?;

    let jar = jar.add(build_removal_cookie(&state.session_config));

    Ok((
        jar,
        Json(MessageResponse {
            message: "session closed".to_owned(),
        }),
    ))
}

/// `GET /auth/session`
///
/// Returns the resolved context of the current session.
pub async fn session_info(session: CurrentSession) -> Json<SessionContext> {
    Json(session.into_inner())
}
