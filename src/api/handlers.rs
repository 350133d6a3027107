//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::sse::sse_stream;
use super::types::{
    ChatRequest, CredentialRequest, ErrorResponse, ReplayRequest, SessionCreatedResponse,
    SuccessResponse, VersionResponse,
};
use super::AppState;
use crate::controller::Event;
use crate::runtime::{Dispatched, RuntimeError, Snapshot};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the chat UI
        .route("/", get(serve_spa))
        .route("/assets/*path", get(serve_static))
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        // Display updates
        .route("/api/sessions/:id/stream", get(stream_session))
        // User actions, one controller pass each
        .route("/api/sessions/:id/credential", post(supply_credential))
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/replay", post(replay_question))
        .route("/api/sessions/:id/clear", post(clear_history))
        .route("/api/sessions/:id/refresh", post(refresh))
        .route("/version", get(get_version))
        .with_state(state)
}

async fn serve_spa() -> Response {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - UI not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Session lifecycle
// ============================================================

async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<SessionCreatedResponse>, AppError> {
    let session_id = state.sessions.create().await;
    let snapshot = state.sessions.snapshot(&session_id).await?;
    Ok(Json(SessionCreatedResponse {
        session_id,
        snapshot,
    }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Snapshot>, AppError> {
    Ok(Json(state.sessions.snapshot(&id).await?))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.remove(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (snapshot, rx) = state.sessions.subscribe(&id).await?;
    Ok(sse_stream(snapshot, rx))
}

// ============================================================
// User actions
// ============================================================

async fn supply_credential(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CredentialRequest>,
) -> Result<Json<Dispatched>, AppError> {
    dispatch(&state, &id, Event::Credential { api_key: req.api_key }).await
}

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<Dispatched>, AppError> {
    dispatch(&state, &id, Event::Question { text: req.text }).await
}

async fn replay_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReplayRequest>,
) -> Result<Json<Dispatched>, AppError> {
    dispatch(&state, &id, Event::Replay { index: req.index }).await
}

async fn clear_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Dispatched>, AppError> {
    dispatch(&state, &id, Event::ClearHistory).await
}

async fn refresh(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Dispatched>, AppError> {
    dispatch(&state, &id, Event::Refresh).await
}

async fn dispatch(state: &AppState, id: &str, event: Event) -> Result<Json<Dispatched>, AppError> {
    Ok(Json(state.sessions.dispatch(id, event).await?))
}

async fn get_version(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        model: state.model.clone(),
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
pub(super) enum AppError {
    NotFound(String),
}

impl From<RuntimeError> for AppError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::SessionNotFound(_) => AppError::NotFound(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
