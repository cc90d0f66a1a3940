//! Upstream inference engine clients.

pub mod ollama;
