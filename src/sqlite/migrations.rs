//! Embedded database migrations for `SQLite`.
//!
//! Migrations are embedded at compile time and run programmatically, tracked
//! in the `_bookshelf_migrations` table.
//!
//! # Example
//!
//! ```rust,ignore
//! use bookshelf::sqlite::migrations;
//! use sqlx::SqlitePool;
//!
//! async fn setup_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
//!     migrations::run(pool).await?;
//!     Ok(())
//! }
//! ```

use sqlx::{Executor, SqlitePool};

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250601000001_create_users_table",
        include_str!("../../migrations_sqlite/20250601000001_create_users_table.sql"),
    ),
    (
        "20250601000002_create_user_sessions_table",
        include_str!("../../migrations_sqlite/20250601000002_create_user_sessions_table.sql"),
    ),
    (
        "20250601000003_create_books_tables",
        include_str!("../../migrations_sqlite/20250601000003_create_books_tables.sql"),
    ),
];

/// Runs all pending database migrations.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    pool.execute(
        r"
        CREATE TABLE IF NOT EXISTS _bookshelf_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        ",
    )
    .await?;

    for (name, sql) in MIGRATIONS {
        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _bookshelf_migrations WHERE name = ?)")
                .bind(*name)
                .fetch_one(pool)
                .await?;

        if !applied {
            // SQLite doesn't support multiple statements in one execute, so
            // we split by semicolons and run each statement.
            //
            // NOTE: This naive splitting will fail if semicolons appear within
            // string literals. The bundled migrations avoid this.
            for statement in sql.split(';') {
                let trimmed = statement.trim();
                if !trimmed.is_empty() {
                    pool.execute(trimmed).await?;
                }
            }

            sqlx::query("INSERT INTO _bookshelf_migrations (name) VALUES (?)")
                .bind(*name)
                .execute(pool)
                .await?;
        }
    }

    Ok(())
}
