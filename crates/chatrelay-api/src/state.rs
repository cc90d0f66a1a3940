//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST
//! API. The chat service and turn orchestrator are generic over the
//! repository and upstream traits, but AppState pins them to the concrete
//! infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use chatrelay_core::chat::service::ChatService;
use chatrelay_core::chat::turn::ChatTurn;
use chatrelay_infra::config::{load_config, resolve_data_dir};
use chatrelay_infra::llm::ollama::OllamaClient;
use chatrelay_infra::sqlite::conversation::SqliteConversationRepository;
use chatrelay_infra::sqlite::pool::DatabasePool;
use chatrelay_types::config::Config;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteConversationRepository>;
pub type ConcreteChatTurn = ChatTurn<SqliteConversationRepository, OllamaClient>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub chat_turn: Arc<ConcreteChatTurn>,
    pub upstream: Arc<OllamaClient>,
    pub config: Arc<Config>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire
    /// services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config();

        // Initialize database
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("chatrelay.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;

        // Wire chat service over the SQLite repository
        let conversation_repo = SqliteConversationRepository::new(db_pool.clone());
        let chat_service = Arc::new(ChatService::new(conversation_repo));

        // Upstream client + turn orchestrator
        let upstream = Arc::new(
            OllamaClient::new(&config.upstream)
                .map_err(|e| anyhow::anyhow!("upstream client init failed: {e}"))?,
        );
        let chat_turn = Arc::new(ChatTurn::new(
            Arc::clone(&chat_service),
            Arc::clone(&upstream),
        ));

        Ok(Self {
            chat_service,
            chat_turn,
            upstream,
            config: Arc::new(config),
            data_dir,
            db_pool,
        })
    }
}
