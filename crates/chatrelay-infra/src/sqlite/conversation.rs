//! SQLite conversation repository implementation.
//!
//! Implements `ConversationRepository` from `chatrelay-core` using sqlx with
//! split read/write pools: raw queries, private Row structs, RFC 3339
//! datetime strings.

use chatrelay_core::chat::repository::ConversationRepository;
use chatrelay_types::chat::{Conversation, ConversationSummary, Message, MessageRole};
use chatrelay_types::error::RepositoryError;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ConversationRepository`.
pub struct SqliteConversationRepository {
    pool: DatabasePool,
}

impl SqliteConversationRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// Internal row type for mapping SQLite rows to domain Conversation.
struct ConversationRow {
    id: String,
    title: String,
    created_at: String,
    updated_at: String,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_conversation(self) -> Result<Conversation, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation id: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;
        let updated_at = parse_datetime(&self.updated_at)?;

        Ok(Conversation {
            id,
            title: self.title,
            created_at,
            updated_at,
        })
    }
}

/// Internal row type for mapping SQLite rows to domain ConversationSummary.
struct SummaryRow {
    id: String,
    title: String,
    created_at: String,
    updated_at: String,
    message_count: i64,
}

impl SummaryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            message_count: row.try_get("message_count")?,
        })
    }

    fn into_summary(self) -> Result<ConversationSummary, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation id: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;
        let updated_at = parse_datetime(&self.updated_at)?;

        Ok(ConversationSummary {
            id,
            title: self.title,
            created_at,
            updated_at,
            message_count: self.message_count as u32,
        })
    }
}

/// Internal row type for mapping SQLite rows to domain Message.
struct MessageRow {
    id: String,
    conversation_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let conversation_id = Uuid::parse_str(&self.conversation_id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation_id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(Message {
            id,
            conversation_id,
            role,
            content: self.content,
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// ConversationRepository implementation
// ---------------------------------------------------------------------------

impl ConversationRepository for SqliteConversationRepository {
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO conversations (id, title, created_at, updated_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(conversation.id.to_string())
        .bind(&conversation.title)
        .bind(format_datetime(&conversation.created_at))
        .bind(format_datetime(&conversation.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?")
            .bind(conversation_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let conversation_row = ConversationRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(conversation_row.into_conversation()?))
            }
            None => Ok(None),
        }
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT c.id, c.title, c.created_at, c.updated_at,
                      (SELECT COUNT(*) FROM messages m WHERE m.conversation_id = c.id) AS message_count
               FROM conversations c
               ORDER BY c.updated_at DESC"#,
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in &rows {
            let summary_row =
                SummaryRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            summaries.push(summary_row.into_summary()?);
        }

        Ok(summaries)
    }

    async fn rename_conversation(
        &self,
        conversation_id: &Uuid,
        title: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE conversations SET title = ? WHERE id = ?")
            .bind(title)
            .bind(conversation_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_conversation(&self, conversation_id: &Uuid) -> Result<(), RepositoryError> {
        // Messages go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(conversation_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn insert_message(&self, message: &Message) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO messages (id, conversation_id, role, content, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.conversation_id.to_string())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn touch_conversation(
        &self,
        conversation_id: &Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&updated_at))
            .bind(conversation_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn get_messages(&self, conversation_id: &Uuid) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE conversation_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(conversation_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let message_row =
                MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(message_row.into_message()?);
        }

        Ok(messages)
    }

    async fn count_messages(&self, conversation_id: &Uuid) -> Result<u32, RepositoryError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE conversation_id = ?")
                .bind(conversation_id.to_string())
                .fetch_one(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count.0 as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_repository() -> (SqliteConversationRepository, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (SqliteConversationRepository::new(pool), dir)
    }

    fn sample_conversation(title: &str) -> Conversation {
        let now = Utc::now();
        Conversation {
            id: Uuid::now_v7(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_message(conversation_id: Uuid, role: MessageRole, content: &str) -> Message {
        Message {
            id: Uuid::now_v7(),
            conversation_id,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_conversation() {
        let (repo, _dir) = test_repository().await;
        let conversation = sample_conversation("Explain recursion");

        repo.create_conversation(&conversation).await.unwrap();

        let loaded = repo
            .get_conversation(&conversation.id)
            .await
            .unwrap()
            .expect("conversation should exist");
        assert_eq!(loaded.id, conversation.id);
        assert_eq!(loaded.title, "Explain recursion");
    }

    #[tokio::test]
    async fn test_get_missing_conversation_returns_none() {
        let (repo, _dir) = test_repository().await;
        let loaded = repo.get_conversation(&Uuid::now_v7()).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_updated_at_desc_with_counts() {
        let (repo, _dir) = test_repository().await;

        let older = sample_conversation("older");
        repo.create_conversation(&older).await.unwrap();
        let newer = sample_conversation("newer");
        repo.create_conversation(&newer).await.unwrap();

        repo.insert_message(&sample_message(older.id, MessageRole::User, "hi"))
            .await
            .unwrap();
        repo.insert_message(&sample_message(older.id, MessageRole::Assistant, "hello"))
            .await
            .unwrap();
        // Bump "newer" past "older" so ordering is deterministic.
        repo.touch_conversation(&newer.id, Utc::now() + chrono::Duration::seconds(5))
            .await
            .unwrap();

        let summaries = repo.list_conversations().await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].title, "newer");
        assert_eq!(summaries[0].message_count, 0);
        assert_eq!(summaries[1].title, "older");
        assert_eq!(summaries[1].message_count, 2);
    }

    #[tokio::test]
    async fn test_rename_conversation() {
        let (repo, _dir) = test_repository().await;
        let conversation = sample_conversation("before");
        repo.create_conversation(&conversation).await.unwrap();

        repo.rename_conversation(&conversation.id, "after")
            .await
            .unwrap();

        let loaded = repo.get_conversation(&conversation.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "after");
    }

    #[tokio::test]
    async fn test_rename_missing_conversation_is_not_found() {
        let (repo, _dir) = test_repository().await;
        let err = repo
            .rename_conversation(&Uuid::now_v7(), "anything")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_messages() {
        let (repo, _dir) = test_repository().await;
        let conversation = sample_conversation("doomed");
        repo.create_conversation(&conversation).await.unwrap();
        repo.insert_message(&sample_message(conversation.id, MessageRole::User, "hi"))
            .await
            .unwrap();

        repo.delete_conversation(&conversation.id).await.unwrap();

        assert!(repo.get_conversation(&conversation.id).await.unwrap().is_none());
        assert_eq!(repo.count_messages(&conversation.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_conversation_is_not_found() {
        let (repo, _dir) = test_repository().await;
        let err = repo.delete_conversation(&Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_messages_come_back_in_insertion_order() {
        let (repo, _dir) = test_repository().await;
        let conversation = sample_conversation("ordered");
        repo.create_conversation(&conversation).await.unwrap();

        for (role, content) in [
            (MessageRole::User, "first"),
            (MessageRole::Assistant, "second"),
            (MessageRole::User, "third"),
        ] {
            repo.insert_message(&sample_message(conversation.id, role, content))
                .await
                .unwrap();
        }

        let messages = repo.get_messages(&conversation.id).await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_insert_message_for_missing_conversation_fails() {
        let (repo, _dir) = test_repository().await;
        let err = repo
            .insert_message(&sample_message(Uuid::now_v7(), MessageRole::User, "orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Query(_)));
    }
}
