use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Visit {
    pub id: i64,
    pub timestamp: String,
    pub origin: Option<String>,
}

/// A freshly stored visit together with the ledger total right after the insert.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedVisit {
    pub visit: Visit,
    pub total: i64,
}

/// Render an instant the way it is stored: fixed microsecond precision and a
/// `Z` suffix, so that text ordering matches time ordering.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
