use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::AppError;
use crate::models::{RecordedVisit, Visit};
use crate::origin::ClientOrigin;
use crate::routes::ListParams;
use crate::AppState;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    visit_id: i64,
    total: i64,
    visits: Vec<VisitView>,
}

struct VisitView {
    id: i64,
    timestamp: String,
    origin: String,
}

impl From<Visit> for VisitView {
    fn from(visit: Visit) -> Self {
        Self {
            id: visit.id,
            timestamp: visit.timestamp,
            origin: visit.origin.unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

#[derive(Serialize)]
struct VisitList {
    total: i64,
    visits: Vec<Visit>,
}

/// JSON acknowledgement for a visit recorded through `/visit`.
#[derive(Serialize)]
struct VisitReceipt {
    visit_id: i64,
    total: i64,
    timestamp: String,
    origin: Option<String>,
}

impl From<RecordedVisit> for VisitReceipt {
    fn from(recorded: RecordedVisit) -> Self {
        Self {
            visit_id: recorded.visit.id,
            total: recorded.total,
            timestamp: recorded.visit.timestamp,
            origin: recorded.visit.origin,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/visit", get(record_visit))
        .route("/visits", get(list_visits))
}

async fn index(
    State(state): State<AppState>,
    origin: ClientOrigin,
) -> Result<Html<String>, AppError> {
    let recorded = state.visits.record_visit(origin.as_deref()).await?;
    let recent = state.visits.list_recent(state.recent_limit).await?;

    let template = IndexTemplate {
        visit_id: recorded.visit.id,
        total: recorded.total,
        visits: recent.into_iter().map(VisitView::from).collect(),
    };
    Ok(Html(template.render()?))
}

async fn record_visit(
    State(state): State<AppState>,
    origin: ClientOrigin,
) -> Result<Json<VisitReceipt>, AppError> {
    let recorded = state.visits.record_visit(origin.as_deref()).await?;
    Ok(Json(VisitReceipt::from(recorded)))
}

async fn list_visits(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<VisitList>, AppError> {
    let limit = params.resolve(state.recent_limit)?;
    let visits = state.visits.list_recent(limit).await?;
    let total = state.visits.count().await?;
    Ok(Json(VisitList { total, visits }))
}
