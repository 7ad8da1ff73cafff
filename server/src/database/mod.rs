// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! SQLite persistence: the pool handle, the schema, and one store module per
//! entity kind. Every query in the stores filters on `owner_id`.
pub mod filters;
pub mod notes;
pub mod ordering;
pub mod tasks;
pub mod timer_sessions;

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::{
    Sqlite, SqlitePool,
    migrate::MigrateDatabase,
    sqlite::SqlitePoolOptions,
};
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        category TEXT NOT NULL DEFAULT 'Work',
        priority TEXT NOT NULL DEFAULT 'Medium',
        status TEXT NOT NULL DEFAULT 'pending',
        completed BOOLEAN NOT NULL DEFAULT 0,
        due_date TIMESTAMP NULL,
        completed_at TIMESTAMP NULL,
        tags TEXT NOT NULL DEFAULT '[]',
        "order" INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL,
        updated_at TIMESTAMP NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_tasks_owner_completed ON tasks (owner_id, completed);",
    "CREATE INDEX IF NOT EXISTS idx_tasks_owner_category ON tasks (owner_id, category);",
    "CREATE INDEX IF NOT EXISTS idx_tasks_owner_due_date ON tasks (owner_id, due_date);",
    r#"
    CREATE TABLE IF NOT EXISTS notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL,
        title TEXT NOT NULL DEFAULT '',
        content TEXT NOT NULL,
        label TEXT NOT NULL DEFAULT 'Work',
        pinned BOOLEAN NOT NULL DEFAULT 0,
        archived BOOLEAN NOT NULL DEFAULT 0,
        trashed BOOLEAN NOT NULL DEFAULT 0,
        tags TEXT NOT NULL DEFAULT '[]',
        color TEXT NOT NULL DEFAULT '#3B82F6',
        "order" INTEGER NOT NULL DEFAULT 0,
        word_count INTEGER NOT NULL DEFAULT 0,
        last_edited TIMESTAMP NOT NULL,
        created_at TIMESTAMP NOT NULL,
        updated_at TIMESTAMP NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_notes_owner_trashed ON notes (owner_id, trashed);",
    "CREATE INDEX IF NOT EXISTS idx_notes_owner_archived ON notes (owner_id, archived);",
    "CREATE INDEX IF NOT EXISTS idx_notes_owner_pinned ON notes (owner_id, pinned);",
    "CREATE INDEX IF NOT EXISTS idx_notes_owner_label ON notes (owner_id, label);",
    r#"
    CREATE TABLE IF NOT EXISTS timer_sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL,
        mode TEXT NOT NULL,
        duration INTEGER NOT NULL CHECK (duration >= 0),
        completed BOOLEAN NOT NULL DEFAULT 0,
        interrupted BOOLEAN NOT NULL DEFAULT 0,
        start_time TIMESTAMP NOT NULL,
        end_time TIMESTAMP NULL,
        notes TEXT NOT NULL DEFAULT '',
        tags TEXT NOT NULL DEFAULT '[]',
        productivity INTEGER NOT NULL DEFAULT 5 CHECK (productivity BETWEEN 1 AND 10),
        created_at TIMESTAMP NOT NULL,
        updated_at TIMESTAMP NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_timer_sessions_owner_mode ON timer_sessions (owner_id, mode);",
    "CREATE INDEX IF NOT EXISTS idx_timer_sessions_owner_completed ON timer_sessions (owner_id, completed);",
    "CREATE INDEX IF NOT EXISTS idx_timer_sessions_owner_start ON timer_sessions (owner_id, start_time);",
];

/// Establishes the database connection pool.
/// If the database does not exist, it creates it (and its directory).
/// It also ensures every table and index exists.
pub async fn establish_connection_pool(database_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        info!("Creating database {}", database_url);
        if let Some(parent) = database_file(database_url).and_then(Path::parent) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        Sqlite::create_database(database_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists.");
    }

    let pool = SqlitePool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Opens a private in-memory database. The pool holds a single connection
/// that never expires, since every connection to `:memory:` is its own
/// database.
pub async fn establish_memory_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .context("Failed to open in-memory database")?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Creates the tables and indexes if they are missing.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to apply schema statement: {}", statement.trim()))?;
    }
    info!("Schema is ready.");
    Ok(())
}

/// Filesystem path behind a `sqlite:` URL, if it names a file.
fn database_file(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(Path::new(path))
}
