//! Conversation CRUD HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/v1/conversations               - List conversation summaries
//! - GET    /api/v1/conversations/{id}          - Get a single conversation
//! - GET    /api/v1/conversations/{id}/messages - Get messages in order
//! - PUT    /api/v1/conversations/{id}/title    - Rename a conversation
//! - DELETE /api/v1/conversations/{id}          - Delete a conversation

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use chatrelay_types::chat::{Conversation, ConversationSummary, Message};
use chatrelay_types::error::ChatError;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Chat(ChatError::InvalidRequest(format!("invalid UUID: {s}"))))
}

/// GET /api/v1/conversations - List conversation summaries, most recently
/// updated first.
pub async fn list_conversations(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<Json<ApiResponse<Vec<ConversationSummary>>>, AppError> {
    let start = Instant::now();

    let summaries = state.chat_service.list_conversations().await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(summaries, elapsed)))
}

/// GET /api/v1/conversations/{id} - Get a conversation by ID.
pub async fn get_conversation(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(conversation_id): Path<String>,
) -> Result<Json<ApiResponse<Conversation>>, AppError> {
    let start = Instant::now();
    let id = parse_uuid(&conversation_id)?;

    let conversation = state
        .chat_service
        .get_conversation(&id)
        .await?
        .ok_or(AppError::Chat(ChatError::NotFound))?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(conversation, elapsed)))
}

/// GET /api/v1/conversations/{id}/messages - Get a conversation's messages
/// in order.
pub async fn get_messages(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(conversation_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Message>>>, AppError> {
    let start = Instant::now();
    let id = parse_uuid(&conversation_id)?;

    // Distinguish an unknown conversation from an empty one.
    if state.chat_service.get_conversation(&id).await?.is_none() {
        return Err(AppError::Chat(ChatError::NotFound));
    }

    let messages = state.chat_service.get_messages(&id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(messages, elapsed)))
}

/// Request body for renaming a conversation.
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub title: String,
}

/// PUT /api/v1/conversations/{id}/title - Rename a conversation.
pub async fn rename_conversation(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(conversation_id): Path<String>,
    Json(body): Json<RenameRequest>,
) -> Result<Json<ApiResponse<Conversation>>, AppError> {
    let start = Instant::now();
    let id = parse_uuid(&conversation_id)?;

    let title = body.title.trim();
    if title.is_empty() {
        return Err(AppError::Chat(ChatError::InvalidRequest(
            "title must not be empty".to_string(),
        )));
    }

    state.chat_service.rename_conversation(&id, title).await?;
    let conversation = state
        .chat_service
        .get_conversation(&id)
        .await?
        .ok_or(AppError::Chat(ChatError::NotFound))?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(conversation, elapsed)))
}

/// DELETE /api/v1/conversations/{id} - Delete a conversation and all its
/// messages.
pub async fn delete_conversation(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(conversation_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let id = parse_uuid(&conversation_id)?;

    state.chat_service.delete_conversation(&id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": true }),
        elapsed,
    )))
}
