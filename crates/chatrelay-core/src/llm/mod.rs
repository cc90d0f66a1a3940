//! Upstream inference engine abstraction.

pub mod provider;

pub use provider::{FragmentStream, UpstreamClient};
