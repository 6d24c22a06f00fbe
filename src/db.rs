use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::LedgerError;
use crate::models::format_timestamp;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Schema statements, each a no-op when the object already exists.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS visits (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        origin TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_visits_timestamp ON visits (timestamp DESC, id DESC)",
    "CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages (created_at DESC, id DESC)",
];

/// Bounded retry budget for the startup connectivity gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

/// Build a lazily-connecting pool. No connection is opened here; the first
/// one is made by [`wait_for_storage`] or by the first request.
pub fn init_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    // Ensure data directory exists
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        let path = path.trim_start_matches("//").split('?').next().unwrap_or_default();
        if !path.starts_with(':') {
            if let Some(parent) = Path::new(path).parent() {
                std::fs::create_dir_all(parent).ok();
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    Ok(SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_lazy_with(options))
}

/// One trivial round-trip: acquire a connection and run `SELECT 1`.
pub async fn ping(pool: &SqlitePool) -> Result<(), LedgerError> {
    let mut conn = pool.acquire().await.map_err(LedgerError::StorageUnavailable)?;
    sqlx::query("SELECT 1")
        .execute(&mut *conn)
        .await
        .map_err(LedgerError::StorageReadFailed)?;
    Ok(())
}

/// Create tables and indexes if absent, then seed `messages` with the given
/// placeholder texts when the table is empty. Returns how many rows were seeded.
///
/// Seeding is check-count-then-insert: two initializers racing on an empty
/// table may both seed.
pub async fn init_schema(pool: &SqlitePool, seed_messages: &[String]) -> Result<usize, LedgerError> {
    let mut conn = pool.acquire().await.map_err(LedgerError::StorageUnavailable)?;

    for statement in SCHEMA {
        sqlx::query(*statement)
            .execute(&mut *conn)
            .await
            .map_err(LedgerError::StorageWriteFailed)?;
    }

    if seed_messages.is_empty() {
        return Ok(0);
    }

    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
        .fetch_one(&mut *conn)
        .await
        .map_err(LedgerError::StorageReadFailed)?;
    if existing > 0 {
        return Ok(0);
    }

    let now = format_timestamp(chrono::Utc::now());
    for text in seed_messages {
        sqlx::query("INSERT INTO messages (text, created_at) VALUES (?, ?)")
            .bind(text)
            .bind(&now)
            .execute(&mut *conn)
            .await
            .map_err(LedgerError::StorageWriteFailed)?;
    }

    tracing::info!(count = seed_messages.len(), "seeded placeholder messages");
    Ok(seed_messages.len())
}

/// Run `probe` until it succeeds or the policy's attempt budget is spent,
/// sleeping `policy.delay` between attempts. A zero budget still makes one
/// attempt. The probe receives the 1-based attempt number.
pub async fn retry_with_policy<T, E, F, Fut>(policy: &RetryPolicy, mut probe: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match probe(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!(attempt, attempts, error = %e, "storage not reachable");
                if attempt >= attempts {
                    return Err(e);
                }
            }
        }
        tokio::time::sleep(policy.delay).await;
        attempt += 1;
    }
}

/// Block until storage answers a ping, or fail after the policy's budget.
/// Returns the attempt number that succeeded.
pub async fn wait_for_storage(pool: &SqlitePool, policy: &RetryPolicy) -> Result<u32, LedgerError> {
    let attempt = retry_with_policy(policy, |attempt| async move {
        ping(pool).await.map(|()| attempt)
    })
    .await
    .map_err(|e| match e {
        LedgerError::StorageReadFailed(inner) | LedgerError::StorageWriteFailed(inner) => {
            LedgerError::StorageUnavailable(inner)
        }
        unavailable => unavailable,
    })?;
    tracing::info!(attempt, "storage reachable");
    Ok(attempt)
}
