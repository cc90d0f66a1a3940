//! Shared domain types for chatrelay.
//!
//! This crate has no I/O: it defines the conversation/message data model,
//! the upstream request types, the error taxonomy, and the configuration
//! schema consumed by the other crates.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
