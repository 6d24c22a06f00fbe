pub mod config;
pub mod db;
pub mod error;
pub mod health;
pub mod ledger;
pub mod models;
pub mod origin;
pub mod routes;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::health::Readiness;
use crate::ledger::{Limit, MessageLedger, VisitLedger};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub visits: VisitLedger,
    pub messages: MessageLedger,
    pub readiness: Readiness,
    pub recent_limit: Limit,
}

impl AppState {
    pub fn new(pool: SqlitePool, readiness: Readiness, recent_limit: Limit) -> Self {
        Self {
            visits: VisitLedger::new(pool.clone()),
            messages: MessageLedger::new(pool.clone()),
            db: pool,
            readiness,
            recent_limit,
        }
    }
}

/// Build the full Axum application router.
///
/// Caller is responsible for running the startup sequence (connectivity
/// gate, schema) on the pool and for marking `state.readiness` afterwards.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::visits::router())
        .merge(routes::messages::router())
        .merge(routes::health::router())
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
