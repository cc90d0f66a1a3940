//! REST API layer: router, handlers, extractors, response envelope.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod relay;
pub mod response;
pub mod router;
