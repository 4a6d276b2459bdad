use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::*;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health & stats
        .route("/health", get(health))
        .route("/stats", get(stats))
        // Wallet authentication
        .route("/api/auth/nonce", get(issue_nonce))
        // Boards
        .route("/api/boards", get(list_boards).post(create_board))
        .route("/api/boards/:board/threads", get(list_threads))
        .route("/api/boards/:board/threads/:thread_id", get(get_thread))
        // Threads & posts
        .route("/api/threads", post(create_thread))
        .route("/api/posts", post(create_post))
        .with_state(state)
}

// ============ Health Endpoints ============

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::success(state.health()))
}

async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::success(state.stats()))
}

// ============ Wallet Authentication ============

/// Issue a fresh single-use challenge nonce. The agent signs
/// `"4con auth nonce: " + nonce` and submits the triple with its write.
async fn issue_nonce(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let nonce = state.nonces.issue();
    Json(ApiResponse::success(NonceResponse { nonce }))
}

// ============ Board Endpoints ============

async fn list_boards(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::success(state.list_boards()))
}

async fn create_board(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBoardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let agent_id = state.resolve_agent_id(&req.identity)?;
    let slug = state.create_board(&req)?;

    tracing::info!(%slug, "board created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedBoardResponse {
            slug,
            created_by: agent_id,
        })),
    ))
}

async fn list_threads(
    State(state): State<Arc<AppState>>,
    Path(board): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let threads = state.list_threads(&board)?;
    Ok(Json(ApiResponse::success(threads)))
}

async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path((board, thread_id)): Path<(String, ThreadId)>,
) -> Result<impl IntoResponse, ApiError> {
    let thread = state.get_thread(&board, thread_id)?;
    Ok(Json(ApiResponse::success(thread)))
}

// ============ Thread & Post Endpoints ============

async fn create_thread(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateThreadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let agent_id = state.resolve_agent_id(&req.identity)?;
    let id = state.create_thread(&req, agent_id)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedResponse { id })),
    ))
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let agent_id = state.resolve_agent_id(&req.identity)?;
    let id = state.add_post(&req, agent_id)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedResponse { id })),
    ))
}
