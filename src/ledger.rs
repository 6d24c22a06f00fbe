//! Append-only visit and message ledgers.
//!
//! Every operation checks a connection out of the pool for its own duration
//! only; the guard goes back to the pool when it drops, on success or error.

use chrono::{DateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::{Connection, Sqlite, SqlitePool};

use crate::error::LedgerError;
use crate::models::{format_timestamp, Message, RecordedVisit, Visit};

/// A positive row limit for "recent" listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(u32);

impl Limit {
    pub const DEFAULT: Limit = Limit(10);
    pub const MAX: u32 = 1000;

    /// `None` for zero; values above [`Limit::MAX`] are clamped.
    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then(|| Limit(value.min(Self::MAX)))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

async fn acquire(pool: &SqlitePool) -> Result<PoolConnection<Sqlite>, LedgerError> {
    pool.acquire().await.map_err(LedgerError::StorageUnavailable)
}

#[derive(Clone)]
pub struct VisitLedger {
    pool: SqlitePool,
}

impl VisitLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a visit stamped with the current time.
    pub async fn record_visit(&self, origin: Option<&str>) -> Result<RecordedVisit, LedgerError> {
        self.record_visit_at(origin, Utc::now()).await
    }

    /// Append a visit with an explicit timestamp and return it along with the
    /// total count observed in the same transaction.
    pub async fn record_visit_at(
        &self,
        origin: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<RecordedVisit, LedgerError> {
        let mut conn = acquire(&self.pool).await?;
        let mut tx = conn.begin().await.map_err(LedgerError::StorageWriteFailed)?;

        let visit: Visit = sqlx::query_as(
            "INSERT INTO visits (timestamp, origin) VALUES (?, ?) RETURNING id, timestamp, origin",
        )
        .bind(format_timestamp(at))
        .bind(origin)
        .fetch_one(&mut *tx)
        .await
        .map_err(LedgerError::StorageWriteFailed)?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visits")
            .fetch_one(&mut *tx)
            .await
            .map_err(LedgerError::StorageReadFailed)?;

        tx.commit().await.map_err(LedgerError::StorageWriteFailed)?;

        tracing::debug!(id = visit.id, total, origin = ?visit.origin, "visit recorded");
        Ok(RecordedVisit { visit, total })
    }

    /// Newest first: timestamp descending, then id descending.
    pub async fn list_recent(&self, limit: Limit) -> Result<Vec<Visit>, LedgerError> {
        let mut conn = acquire(&self.pool).await?;
        sqlx::query_as(
            "SELECT id, timestamp, origin FROM visits ORDER BY timestamp DESC, id DESC LIMIT ?",
        )
        .bind(i64::from(limit.get()))
        .fetch_all(&mut *conn)
        .await
        .map_err(LedgerError::StorageReadFailed)
    }

    pub async fn count(&self) -> Result<i64, LedgerError> {
        let mut conn = acquire(&self.pool).await?;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visits")
            .fetch_one(&mut *conn)
            .await
            .map_err(LedgerError::StorageReadFailed)?;
        Ok(count)
    }
}

#[derive(Clone)]
pub struct MessageLedger {
    pool: SqlitePool,
}

impl MessageLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a message. The text is stored as given, empty strings included.
    pub async fn add_message(&self, text: &str) -> Result<Message, LedgerError> {
        let mut conn = acquire(&self.pool).await?;
        let message: Message = sqlx::query_as(
            "INSERT INTO messages (text, created_at) VALUES (?, ?) RETURNING id, text, created_at",
        )
        .bind(text)
        .bind(format_timestamp(Utc::now()))
        .fetch_one(&mut *conn)
        .await
        .map_err(LedgerError::StorageWriteFailed)?;

        tracing::debug!(id = message.id, "message added");
        Ok(message)
    }

    pub async fn list_recent(&self, limit: Limit) -> Result<Vec<Message>, LedgerError> {
        let mut conn = acquire(&self.pool).await?;
        sqlx::query_as(
            "SELECT id, text, created_at FROM messages ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(i64::from(limit.get()))
        .fetch_all(&mut *conn)
        .await
        .map_err(LedgerError::StorageReadFailed)
    }

    pub async fn count(&self) -> Result<i64, LedgerError> {
        let mut conn = acquire(&self.pool).await?;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&mut *conn)
            .await
            .map_err(LedgerError::StorageReadFailed)?;
        Ok(count)
    }
}
