//! HTTP front ends
//!
//! - `GET /` renders a text-input page; `GET /?q=...` answers inline
//! - `POST /chat` takes `{"message": ...}` and returns `{"response": ...}`
//! - `GET /health` reports liveness and the indexed chunk count

mod error;
mod page;

pub use error::ApiError;
pub use page::{escape_html, render, PageBody};

use crate::chain::RetrievalQa;
use crate::error::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared, read-only state for every request
pub struct AppState {
    pub qa: RetrievalQa,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub q: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/chat", post(chat))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn chat(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> std::result::Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::internal(rejection.body_text()))?;

    let answer = state.qa.ask(&request.message).await.map_err(|e| {
        error!("Chat request failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(ChatResponse {
        response: answer.answer,
    }))
}

async fn index_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let question = query.q.unwrap_or_default();
    let question = question.trim();
    if question.is_empty() {
        return Html(render(PageBody::Empty));
    }

    match state.qa.ask(question).await {
        Ok(answer) => Html(render(PageBody::Answer {
            question,
            answer: &answer.answer,
        })),
        Err(e) => {
            error!("Page query failed: {}", e);
            let message = e.to_string();
            Html(render(PageBody::Error {
                question,
                message: &message,
            }))
        }
    }
}

async fn health(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    let chunks = state.qa.index().count().await?;
    Ok(Json(serde_json::json!({ "status": "ok", "chunks": chunks })))
}
