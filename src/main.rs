//! Server binary: wiring, seeding, serving.

use std::env;

use sqlx::sqlite::SqlitePoolOptions;
use tower_http::timeout::TimeoutLayer;

use bookshelf::api::{cors, router, AppState};
use bookshelf::config::{AppConfig, PasswordScheme};
use bookshelf::crypto::{Argon2Hasher, PasswordHasher, Sha256Hasher};
use bookshelf::sqlite::{migrations, SqliteBookRepository, SqliteSessionStore, SqliteUserRepository};
use bookshelf::{CredentialVerifier, SessionManager, UserRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = AppConfig::from_env();
    config.session.validate()?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    migrations::run(&pool).await?;

    let users = SqliteUserRepository::new(pool.clone());
    let sessions = SessionManager::new(
        SqliteSessionStore::new(pool.clone()),
        users.clone(),
        config.session.session_lifetime,
    );
    let books = SqliteBookRepository::new(pool);

    seed_user(&users, config.password_scheme).await?;

    let app = match config.password_scheme {
        PasswordScheme::Sha256 => router(AppState {
            sessions,
            verifier: CredentialVerifier::new(users, Sha256Hasher),
            books,
            session_config: config.session.clone(),
        }),
        PasswordScheme::Argon2 => router(AppState {
            sessions,
            verifier: CredentialVerifier::new(users, Argon2Hasher::default()),
            books,
            session_config: config.session.clone(),
        }),
    };

    let mut app = app.layer(TimeoutLayer::new(config.request_timeout));
    if let Some(ref origin) = config.cors_origin {
        app = app.layer(cors::for_origin(origin));
    }

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    log::info!(target: "bookshelf", "msg=\"server started\" port={}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Creates the user named by `SEED_USER_LOGIN` / `SEED_USER_PASSWORD` if it
/// does not exist yet. There is no signup endpoint; this is how a fresh
/// database gets its first account.
async fn seed_user(
    users: &SqliteUserRepository,
    scheme: PasswordScheme,
) -> Result<(), Box<dyn std::error::Error>> {
    let (login, password) = match (env::var("SEED_USER_LOGIN"), env::var("SEED_USER_PASSWORD")) {
        (Ok(login), Ok(password)) => (login, password),
        _ => return Ok(()),
    };

    if users.find_user_by_login(&login).await?.is_some() {
        return Ok(());
    }

    let hasher: Box<dyn PasswordHasher> = match scheme {
        PasswordScheme::Sha256 => Box::new(Sha256Hasher),
        PasswordScheme::Argon2 => Box::new(Argon2Hasher::default()),
    };
    let name = env::var("SEED_USER_NAME").unwrap_or_else(|_| login.clone());

    users
        .create_user(&login, &name, &hasher.hash(&password)?)
        .await?;

    log::info!(target: "bookshelf", "msg=\"seed user created\" login=\"{login}\"");

    Ok(())
}
