//! SSE streaming chat endpoint.
//!
//! POST /api/v1/chat/stream
//!
//! Runs one chat turn and relays it as Server-Sent Events. Validation
//! failures and unknown conversation ids are rejected synchronously with an
//! HTTP status; once the stream starts, failures arrive as a terminal
//! `error` event (see [`crate::http::relay`] for the event grammar).

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_stream::Stream;
use uuid::Uuid;

use chatrelay_core::chat::turn::ChatRequest;
use chatrelay_types::llm::GenerateOptions;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::relay::to_sse_event;
use crate::state::AppState;

/// Request body for the streaming chat endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamChatRequest {
    /// Existing conversation to continue; if absent, a new one is created.
    pub conversation_id: Option<Uuid>,
    /// The user message.
    pub message: String,
    /// Model override; falls back to the configured default.
    pub model: Option<String>,
    /// Sampling options forwarded to the upstream engine.
    #[serde(default)]
    pub options: GenerateOptions,
}

/// POST /api/v1/chat/stream — SSE streaming chat.
pub async fn stream_chat(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(body): Json<StreamChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let request = ChatRequest {
        conversation_id: body.conversation_id,
        message: body.message,
        model: body
            .model
            .unwrap_or_else(|| state.config.default_model().to_string()),
        options: body.options,
    };

    let turn = state.chat_turn.run(request).await?;

    let sse_stream = turn.map(|event| Ok::<_, Infallible>(to_sse_event(event)));

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
