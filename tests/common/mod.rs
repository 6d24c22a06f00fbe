// Shared by several test binaries; not every helper is used by each.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tempfile::TempDir;

use visit_ledger::health::Readiness;
use visit_ledger::ledger::Limit;
use visit_ledger::{build_app, db, AppState};

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
    pub readiness: Readiness,
}

impl TestApp {
    /// App backed by a fresh in-memory database, schema initialized and marked ready.
    pub async fn new() -> Self {
        let pool = memory_pool().await;
        db::init_schema(&pool, &[])
            .await
            .expect("Failed to initialize schema");

        let app = Self::with_pool(pool);
        app.readiness.mark_ready();
        app
    }

    /// App whose storage can never be opened. Not marked ready.
    pub fn unreachable(dir: &TempDir) -> Self {
        Self::with_pool(unreachable_pool(dir))
    }

    pub fn with_pool(pool: SqlitePool) -> Self {
        let readiness = Readiness::new();
        let state = AppState::new(pool.clone(), readiness.clone(), Limit::DEFAULT);
        Self {
            router: build_app(state),
            db: pool,
            readiness,
        }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request(req).await
    }

    pub async fn get_with_header(&self, uri: &str, name: &str, value: &str) -> Response {
        let req = Request::builder()
            .uri(uri)
            .header(name, value)
            .body(Body::empty())
            .unwrap();
        self.request(req).await
    }
}

pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory SQLite pool")
}

/// A pool pointing at a file inside a directory that does not exist, with
/// creation disabled, so every connection attempt fails immediately.
pub fn unreachable_pool(dir: &TempDir) -> SqlitePool {
    let path = dir.path().join("missing").join("visits.db");
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(false);

    SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(options)
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
}
