//! Application layer for chatrelay: CLI, router, handlers, state wiring.
//!
//! Exposed as a library so integration tests can build the real router
//! against a scratch data directory.

pub mod cli;
pub mod http;
pub mod state;
