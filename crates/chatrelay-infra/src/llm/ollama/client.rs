//! Ollama generate-stream client.
//!
//! One POST to `/api/generate` with `stream: true`, then the body arrives as
//! newline-delimited JSON. Byte chunks do not line up with JSON lines, so a
//! carry buffer splits on `\n` and decodes complete lines only. A malformed
//! line is logged and skipped; an inline `error` field ends the stream; a
//! quiet connection trips the idle timeout.

use std::time::Duration;

use futures_util::StreamExt;
use tracing::{debug, warn};

use chatrelay_core::llm::{FragmentStream, UpstreamClient};
use chatrelay_types::config::UpstreamConfig;
use chatrelay_types::error::UpstreamError;
use chatrelay_types::llm::{GenerateRequest, ModelInfo};

use super::types::{OllamaChunk, OllamaGenerateRequest, OllamaOptions, OllamaTagsResponse};

/// Streaming client for an Ollama-compatible server.
#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    idle_timeout: Duration,
}

/// A decoded NDJSON line: the text it carried and whether it was terminal.
#[derive(Debug)]
struct Decoded {
    text: String,
    done: bool,
}

/// Decode one NDJSON line from the generate stream.
///
/// Returns `Ok(None)` for blank lines, `Err(Protocol)` for undecodable ones
/// (the caller skips those), and `Err(Reported)` when the engine put an
/// inline error in the chunk (terminal).
fn decode_line(line: &str) -> Result<Option<Decoded>, UpstreamError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let chunk: OllamaChunk = serde_json::from_str(line)
        .map_err(|e| UpstreamError::Protocol(format!("undecodable chunk: {e}")))?;

    if let Some(message) = chunk.error {
        return Err(UpstreamError::Reported(message));
    }

    Ok(Some(Decoded {
        text: chunk.response,
        done: chunk.done,
    }))
}

/// Decode a raw line from the carry buffer. Lines are complete here, so any
/// invalid UTF-8 is genuinely malformed data, not a chunk-boundary artifact.
fn decode_line_bytes(line: &[u8]) -> Result<Option<Decoded>, UpstreamError> {
    let line = std::str::from_utf8(line)
        .map_err(|e| UpstreamError::Protocol(format!("invalid utf-8 in chunk: {e}")))?;
    decode_line(line)
}

impl OllamaClient {
    /// Create a client from the upstream configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            idle_timeout: Duration::from_secs(config.idle_timeout_secs),
        })
    }

    /// List models available on the upstream engine.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, UpstreamError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Protocol(format!("undecodable tags response: {e}")))?;

        Ok(tags
            .models
            .into_iter()
            .map(|m| ModelInfo {
                name: m.name,
                size: m.size,
            })
            .collect())
    }

    /// Check upstream reachability. Used by the health endpoint.
    pub async fn ping(&self) -> Result<(), UpstreamError> {
        self.list_models().await.map(|_| ())
    }
}

impl UpstreamClient for OllamaClient {
    async fn stream(&self, request: GenerateRequest) -> Result<FragmentStream, UpstreamError> {
        let url = format!("{}/api/generate", self.base_url);
        let has_options =
            request.options.temperature.is_some() || request.options.max_tokens.is_some();
        let body = OllamaGenerateRequest {
            model: request.model,
            prompt: request.prompt,
            stream: true,
            options: has_options.then(|| OllamaOptions {
                temperature: request.options.temperature,
                num_predict: request.options.max_tokens,
            }),
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        let idle_timeout = self.idle_timeout;
        let idle_secs = idle_timeout.as_secs();

        // Dropping the returned stream drops `response`, which closes the
        // upstream connection. That is the cancellation path.
        let stream = async_stream::stream! {
            let mut bytes = response.bytes_stream();
            // Network chunk boundaries are arbitrary: a JSON line, or even a
            // single multi-byte character, can straddle two chunks. Buffer
            // raw bytes and UTF-8-decode only complete lines.
            let mut carry: Vec<u8> = Vec::new();

            loop {
                let next = match tokio::time::timeout(idle_timeout, bytes.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        yield Err(UpstreamError::Timeout(idle_secs));
                        return;
                    }
                };

                let Some(result) = next else {
                    // Stream ended without a done chunk. An unterminated
                    // final line still counts; otherwise whatever text was
                    // relayed stands.
                    if carry.is_empty() {
                        debug!("generate stream ended without done chunk");
                        return;
                    }
                    match decode_line_bytes(&carry) {
                        Ok(Some(decoded)) if !decoded.text.is_empty() => {
                            yield Ok(decoded.text);
                        }
                        Ok(_) => {}
                        Err(UpstreamError::Protocol(message)) => {
                            warn!(%message, "skipping malformed stream chunk");
                        }
                        Err(e) => {
                            yield Err(e);
                        }
                    }
                    return;
                };

                let chunk = match result {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(UpstreamError::Unavailable(e.to_string()));
                        return;
                    }
                };

                carry.extend_from_slice(&chunk);

                while let Some(newline) = carry.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = carry.drain(..=newline).collect();
                    match decode_line_bytes(&line) {
                        Ok(None) => {}
                        Ok(Some(decoded)) => {
                            if !decoded.text.is_empty() {
                                yield Ok(decoded.text);
                            }
                            if decoded.done {
                                return;
                            }
                        }
                        Err(UpstreamError::Protocol(message)) => {
                            warn!(%message, "skipping malformed stream chunk");
                        }
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
