//! Ollama streaming client.
//!
//! Speaks the Ollama generate API: a single POST with `stream: true`, then
//! newline-delimited JSON chunks until a `done: true` chunk. The adapter in
//! [`client`] maps that framing to the provider-agnostic `FragmentStream`
//! defined in `chatrelay-core`.

mod client;
mod types;

pub use client::OllamaClient;
