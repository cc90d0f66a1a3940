//! Turn event to SSE event mapping.
//!
//! SSE event types:
//! - `conversation` — initial event: `{ "conversation_id": "...", "created": bool }`
//! - `chunk` — incremental text: `{ "content": "..." }`
//! - `done` — reply committed: `{ "conversation_id": "...", "message_id": "..." }`
//! - `error` — turn failed: `{ "kind": "...", "message": "..." }`

use axum::response::sse::Event;
use serde_json::json;

use chatrelay_core::chat::turn::TurnEvent;

/// Map one turn event to its SSE representation.
pub fn to_sse_event(event: TurnEvent) -> Event {
    match event {
        TurnEvent::Started {
            conversation_id,
            created,
        } => Event::default().event("conversation").data(
            json!({
                "conversation_id": conversation_id.to_string(),
                "created": created,
            })
            .to_string(),
        ),
        TurnEvent::Chunk { content } => Event::default()
            .event("chunk")
            .data(json!({ "content": content }).to_string()),
        TurnEvent::Done {
            conversation_id,
            message_id,
        } => Event::default().event("done").data(
            json!({
                "conversation_id": conversation_id.to_string(),
                "message_id": message_id.to_string(),
            })
            .to_string(),
        ),
        TurnEvent::Error { kind, message } => Event::default()
            .event("error")
            .data(json!({ "kind": kind, "message": message }).to_string()),
    }
}
