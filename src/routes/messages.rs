use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::AppError;
use crate::models::Message;
use crate::routes::ListParams;
use crate::AppState;

#[derive(Serialize)]
struct MessageList {
    total: i64,
    messages: Vec<Message>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add/{text}", get(add_message))
        .route("/messages", get(list_messages))
}

async fn add_message(
    State(state): State<AppState>,
    Path(text): Path<String>,
) -> Result<Json<Message>, AppError> {
    let message = state.messages.add_message(&text).await?;
    Ok(Json(message))
}

async fn list_messages(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<MessageList>, AppError> {
    let limit = params.resolve(state.recent_limit)?;
    let messages = state.messages.list_recent(limit).await?;
    let total = state.messages.count().await?;
    Ok(Json(MessageList { total, messages }))
}
