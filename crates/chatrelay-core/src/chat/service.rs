//! Conversation service: the persistence facade for chat turns.
//!
//! Wraps a `ConversationRepository` and owns the per-conversation append
//! locks: all message appends for one conversation id pass through a single
//! `tokio::sync::Mutex`, so two concurrent turns can never interleave a
//! message insert with the matching updated_at bump, and store order always
//! equals append completion order. Appends to different conversations share
//! no lock and proceed fully in parallel.

use std::sync::Arc;

use chatrelay_types::chat::{Conversation, ConversationSummary, Message, MessageRole};
use chatrelay_types::error::RepositoryError;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::chat::repository::ConversationRepository;
use crate::chat::title;

/// Orchestrates conversation lifecycle and serialized message appends.
pub struct ChatService<R: ConversationRepository> {
    repo: R,
    /// Append lock per conversation id. Entries are never removed; one Arc
    /// per conversation that has seen an append this process lifetime.
    append_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl<R: ConversationRepository> ChatService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            append_locks: DashMap::new(),
        }
    }

    /// Access the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    fn append_lock(&self, conversation_id: Uuid) -> Arc<Mutex<()>> {
        self.append_locks
            .entry(conversation_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // --- Conversation lifecycle ---

    /// Create a new conversation. When `title` is `None` the caller is
    /// expected to derive one from the first message (see [`title::derive`]).
    pub async fn create_conversation(
        &self,
        title: String,
    ) -> Result<Conversation, RepositoryError> {
        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::now_v7(),
            title,
            created_at: now,
            updated_at: now,
        };
        self.repo.create_conversation(&conversation).await?;
        debug!(conversation_id = %conversation.id, "conversation created");
        Ok(conversation)
    }

    /// Create a conversation titled from the first user message.
    pub async fn create_conversation_from_message(
        &self,
        first_message: &str,
    ) -> Result<Conversation, RepositoryError> {
        self.create_conversation(title::derive(first_message)).await
    }

    pub async fn get_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<Conversation>, RepositoryError> {
        self.repo.get_conversation(conversation_id).await
    }

    /// List conversation summaries, most recently updated first.
    pub async fn list_conversations(
        &self,
    ) -> Result<Vec<ConversationSummary>, RepositoryError> {
        self.repo.list_conversations().await
    }

    pub async fn rename_conversation(
        &self,
        conversation_id: &Uuid,
        title: &str,
    ) -> Result<(), RepositoryError> {
        self.repo.rename_conversation(conversation_id, title).await
    }

    /// Delete a conversation and all its messages.
    pub async fn delete_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<(), RepositoryError> {
        self.repo.delete_conversation(conversation_id).await
    }

    // --- Message persistence ---

    /// Append a message at the tail of a conversation.
    ///
    /// This is the per-conversation sequencing point: the insert and the
    /// updated_at bump happen under the conversation's append lock, and the
    /// conversation's existence is re-checked inside the lock so an append
    /// racing a delete fails with `NotFound` rather than writing an orphan.
    pub async fn append_message(
        &self,
        conversation_id: Uuid,
        role: MessageRole,
        content: String,
    ) -> Result<Message, RepositoryError> {
        let lock = self.append_lock(conversation_id);
        let _guard = lock.lock().await;

        if self.repo.get_conversation(&conversation_id).await?.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let message = Message {
            id: Uuid::now_v7(),
            conversation_id,
            role,
            content,
            created_at: Utc::now(),
        };
        self.repo.insert_message(&message).await?;
        self.repo
            .touch_conversation(&conversation_id, message.created_at)
            .await?;
        Ok(message)
    }

    /// Get a conversation's messages in order.
    pub async fn get_messages(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<Message>, RepositoryError> {
        self.repo.get_messages(conversation_id).await
    }
}
