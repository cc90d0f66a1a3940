//! Chat turn orchestration.
//!
//! One turn: validate the request, resolve or create the conversation,
//! persist the user message, assemble context, stream the upstream reply to
//! the caller, and commit the assembled reply on success.
//!
//! The user message is durable before the upstream connection is opened, so
//! a crash or upstream failure mid-generation never loses the caller's
//! input. The assistant reply accumulates in a local buffer and is written
//! exactly once, after the stream ends with at least one fragment; a failed
//! or abandoned turn persists nothing beyond the user message. Dropping the
//! returned stream (caller disconnect) drops the upstream stream with it,
//! closing the connection and discarding the partial reply.

use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use chatrelay_types::chat::MessageRole;
use chatrelay_types::error::{ChatError, RepositoryError};
use chatrelay_types::llm::{GenerateOptions, GenerateRequest};

use crate::chat::context;
use crate::chat::repository::ConversationRepository;
use crate::chat::service::ChatService;
use crate::llm::UpstreamClient;

/// An inbound chat request, already deserialized and defaulted.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Absent means "start a new conversation".
    pub conversation_id: Option<Uuid>,
    pub message: String,
    pub model: String,
    pub options: GenerateOptions,
}

/// Events emitted over the lifetime of one turn, relayed to the caller as
/// a push stream. Exactly one terminal event (`Done` or `Error`) follows
/// zero or more `Chunk`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// First event, always: identifies the conversation this turn belongs
    /// to, and whether it was created by this turn.
    Started {
        conversation_id: Uuid,
        created: bool,
    },
    /// One upstream fragment, forwarded without buffering.
    Chunk { content: String },
    /// The assistant reply was committed.
    Done {
        conversation_id: Uuid,
        message_id: Uuid,
    },
    /// The turn failed after the user message was persisted. No assistant
    /// message was written.
    Error {
        kind: &'static str,
        message: String,
    },
}

impl TurnEvent {
    fn from_error(e: &ChatError) -> Self {
        TurnEvent::Error {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// Orchestrates single chat turns against a service and an upstream client.
pub struct ChatTurn<R: ConversationRepository, U: UpstreamClient> {
    service: Arc<ChatService<R>>,
    upstream: Arc<U>,
}

impl<R, U> ChatTurn<R, U>
where
    R: ConversationRepository + 'static,
    U: UpstreamClient + 'static,
{
    pub fn new(service: Arc<ChatService<R>>, upstream: Arc<U>) -> Self {
        Self { service, upstream }
    }

    /// Run one turn.
    ///
    /// Validation failures and unknown conversation ids are returned as
    /// `Err` before any side effect. Once the user message is persisted the
    /// turn is a stream: upstream failures arrive as a terminal
    /// [`TurnEvent::Error`] on it.
    #[instrument(name = "chat_turn", skip(self, request), fields(model = %request.model))]
    // `use<R, U>` keeps the `&self` lifetime out of the opaque stream type;
    // the stream owns Arc clones of the service and upstream, nothing more.
    pub async fn run(
        &self,
        request: ChatRequest,
    ) -> Result<impl futures_util::Stream<Item = TurnEvent> + Send + 'static + use<R, U>, ChatError>
    {
        validate(&request)?;

        // Resolve or create the conversation.
        let (conversation, created) = match request.conversation_id {
            Some(id) => {
                let conversation = self
                    .service
                    .get_conversation(&id)
                    .await?
                    .ok_or(ChatError::NotFound)?;
                (conversation, false)
            }
            None => {
                let conversation = self
                    .service
                    .create_conversation_from_message(&request.message)
                    .await?;
                (conversation, true)
            }
        };
        let conversation_id = conversation.id;

        // Durability before generation: the user message is committed even
        // if everything after this point fails.
        self.service
            .append_message(conversation_id, MessageRole::User, request.message.clone())
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ChatError::NotFound,
                other => ChatError::from(other),
            })?;

        let history = self.service.get_messages(&conversation_id).await?;
        let prompt = context::assemble(&history);

        let generate = GenerateRequest {
            model: request.model,
            prompt,
            options: request.options,
        };

        let service = Arc::clone(&self.service);
        let upstream = Arc::clone(&self.upstream);

        Ok(async_stream::stream! {
            yield TurnEvent::Started { conversation_id, created };

            let fragments = match upstream.stream(generate).await {
                Ok(fragments) => fragments,
                Err(e) => {
                    warn!(conversation_id = %conversation_id, error = %e, "upstream connection failed");
                    yield TurnEvent::from_error(&ChatError::from(e));
                    return;
                }
            };
            let mut fragments = std::pin::pin!(fragments);

            let mut pending_reply = String::new();
            while let Some(next) = fragments.next().await {
                match next {
                    Ok(fragment) => {
                        pending_reply.push_str(&fragment);
                        yield TurnEvent::Chunk { content: fragment };
                    }
                    Err(e) => {
                        warn!(conversation_id = %conversation_id, error = %e, "upstream stream failed");
                        yield TurnEvent::from_error(&ChatError::from(e));
                        return;
                    }
                }
            }

            // A stream that ends without producing any text is a failure,
            // never an empty success.
            if pending_reply.is_empty() {
                yield TurnEvent::from_error(&ChatError::EmptyResponse);
                return;
            }

            match service
                .append_message(conversation_id, MessageRole::Assistant, pending_reply)
                .await
            {
                Ok(message) => {
                    info!(
                        conversation_id = %conversation_id,
                        message_id = %message.id,
                        "assistant reply committed"
                    );
                    yield TurnEvent::Done {
                        conversation_id,
                        message_id: message.id,
                    };
                }
                Err(e) => {
                    yield TurnEvent::from_error(&ChatError::from(e));
                }
            }
        })
    }
}

/// Validate a chat request. No side effects.
fn validate(request: &ChatRequest) -> Result<(), ChatError> {
    if request.message.trim().is_empty() {
        return Err(ChatError::InvalidRequest("message must not be empty".into()));
    }
    if request.model.is_empty() {
        return Err(ChatError::InvalidRequest("model must not be empty".into()));
    }
    if !request
        .model
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':' | '-'))
    {
        return Err(ChatError::InvalidRequest(format!(
            "invalid model identifier: '{}'",
            request.model
        )));
    }
    Ok(())
}
