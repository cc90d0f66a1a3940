//! Infrastructure implementations for chatrelay.
//!
//! Concrete adapters behind the traits defined in `chatrelay-core`:
//! SQLite persistence (sqlx), the Ollama streaming client (reqwest), and
//! the configuration loader.

pub mod config;
pub mod llm;
pub mod sqlite;
