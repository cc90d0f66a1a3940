//! Business logic for chatrelay.
//!
//! Defines the repository and upstream-client traits, the conversation
//! service (persistence facade with per-conversation append serialization),
//! pure context/title helpers, and the chat turn orchestrator. Concrete
//! SQLite and Ollama implementations live in `chatrelay-infra`; this crate
//! performs no I/O of its own.

pub mod chat;
pub mod llm;
