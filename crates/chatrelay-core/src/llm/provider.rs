//! UpstreamClient trait: streaming access to the inference engine.

use std::pin::Pin;

use futures_util::Stream;

use chatrelay_types::error::UpstreamError;
use chatrelay_types::llm::GenerateRequest;

/// A finite, non-restartable sequence of generated text fragments.
///
/// Dropping the stream closes the underlying connection; the fragments stop
/// and no stray connection is left open.
pub type FragmentStream =
    Pin<Box<dyn Stream<Item = Result<String, UpstreamError>> + Send + 'static>>;

/// Streaming client for the upstream inference engine.
///
/// Implementations live in chatrelay-infra (e.g., `OllamaClient`). A client
/// instance may be shared across turns, but each call to `stream` opens a
/// dedicated connection owned by the returned stream.
pub trait UpstreamClient: Send + Sync {
    /// Open a streaming generation.
    ///
    /// Fails with [`UpstreamError::Unavailable`] when the connection cannot
    /// be established; errors after the stream has started arrive as `Err`
    /// items on the stream itself.
    fn stream(
        &self,
        request: GenerateRequest,
    ) -> impl std::future::Future<Output = Result<FragmentStream, UpstreamError>> + Send;
}
