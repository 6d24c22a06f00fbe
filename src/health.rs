use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::db;
use crate::models::format_timestamp;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub ok: bool,
    pub storage_connected: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReadinessReport {
    pub ready: bool,
}

/// Liveness: one storage round-trip. Failures come back as data, never as an error.
pub async fn check_health(pool: &SqlitePool) -> HealthReport {
    let storage_connected = match db::ping(pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(kind = e.kind(), "health check failed: {e}");
            false
        }
    };

    HealthReport {
        ok: storage_connected,
        storage_connected,
        timestamp: format_timestamp(chrono::Utc::now()),
    }
}

/// Set once the startup sequence (connectivity gate, schema) has completed.
#[derive(Debug, Clone, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn report(&self) -> ReadinessReport {
        ReadinessReport {
            ready: self.is_ready(),
        }
    }
}
