use std::{str::FromStr, time::Duration};

use arcade_server_domain::ServiceError;
use chrono::{DateTime, Utc};
use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

pub mod games;
pub mod players;
pub mod stats;

pub const MEMORY_DB: &str = ":memory:";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS players (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS games (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        score INTEGER NOT NULL,
        avg_mic_level REAL NOT NULL DEFAULT 0,
        max_mic_level REAL NOT NULL DEFAULT 0,
        duration_seconds INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_games_player ON games (player_id, created_at)",
    "CREATE TABLE IF NOT EXISTS player_stats (
        player_id INTEGER PRIMARY KEY REFERENCES players(id) ON DELETE CASCADE,
        total_games INTEGER NOT NULL DEFAULT 0,
        best_score INTEGER NOT NULL DEFAULT 0,
        avg_score REAL NOT NULL DEFAULT 0,
        updated_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_stats_best_score ON player_stats (best_score DESC, player_id)",
];

pub fn create_db_pool(db_path: &str) -> Pool<Sqlite> {
    let conn_options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_lazy_with(conn_options)
}

/// A private in-memory database. The pool keeps exactly one connection alive
/// for its whole lifetime, since the data disappears with the connection.
pub async fn create_memory_pool() -> Result<Pool<Sqlite>, sqlx::Error> {
    let conn_options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(conn_options)
        .await?;
    create_schema(&pool).await?;
    Ok(pool)
}

pub async fn create_schema(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Opens the database at `db_path` (or an in-memory one for [`MEMORY_DB`])
/// and makes sure the schema exists.
pub async fn open_database(db_path: &str) -> Result<Pool<Sqlite>, sqlx::Error> {
    if db_path == MEMORY_DB {
        log::warn!("Using an in-memory database, all data is lost on shutdown");
        return create_memory_pool().await;
    }
    let pool = create_db_pool(db_path);
    create_schema(&pool).await?;
    log::info!("Opened database at {}", db_path);
    Ok(pool)
}

pub(crate) fn storage_error(e: sqlx::Error) -> ServiceError {
    ServiceError::Internal(e.to_string())
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_error| db_error.is_unique_violation())
}

pub(crate) fn millis_to_datetime(millis: i64) -> sqlx::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        sqlx::Error::Decode(format!("timestamp {} is out of range", millis).into())
    })
}
