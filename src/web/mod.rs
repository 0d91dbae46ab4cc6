//! HTTP 接口（feature = "web"）
//!
//! 四个路由，全部共享同一个 `Arc<OrchestrationContext>`：
//! - POST /chat：跑一轮三段流水线
//! - POST /clear_conversation?conversation_id=
//! - GET  /get_conversation_history?conversation_id=
//! - GET  /health

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::core::{OrchestrationContext, TaskResult};
use crate::memory::HistoryMessage;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    pub conversation_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: TaskResult,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub detail: String,
}

#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub conversation_id: String,
}

pub fn router(context: Arc<OrchestrationContext>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/clear_conversation", post(clear_conversation))
        .route("/get_conversation_history", get(get_conversation_history))
        .route("/health", get(|| async { "OK" }))
        .with_state(context)
}

async fn chat(
    State(context): State<Arc<OrchestrationContext>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorDetail>)> {
    match context.chat(&req.conversation_id, &req.query).await {
        Ok(response) => Ok(Json(ChatResponse { response })),
        Err(e) => {
            tracing::error!(conversation_id = %req.conversation_id, error = %e, "Chat request failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorDetail {
                    detail: format!("Internal Server Error: {e}"),
                }),
            ))
        }
    }
}

async fn clear_conversation(
    State(context): State<Arc<OrchestrationContext>>,
    Query(q): Query<ConversationQuery>,
) -> Json<serde_json::Value> {
    context.clear(&q.conversation_id).await;
    Json(serde_json::json!({
        "message": format!("Conversation {} cleared.", q.conversation_id)
    }))
}

async fn get_conversation_history(
    State(context): State<Arc<OrchestrationContext>>,
    Query(q): Query<ConversationQuery>,
) -> Json<Vec<HistoryMessage>> {
    Json(context.history(&q.conversation_id).await)
}
