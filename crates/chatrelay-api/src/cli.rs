//! CLI argument definitions and command implementations.

use clap::{Parser, Subcommand};

use chatrelay_core::chat::repository::ConversationRepository;

use crate::state::AppState;

/// Streaming chat relay over an Ollama-compatible engine.
#[derive(Debug, Parser)]
#[command(name = "chatrelay", version, about)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit machine-readable JSON instead of styled output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8787", env = "CHATRELAY_PORT")]
        port: u16,
        /// Host to bind
        #[arg(long, default_value = "127.0.0.1", env = "CHATRELAY_HOST")]
        host: String,
    },
    /// Show service status: data dir, stored conversations, upstream reachability
    Status,
}

/// `status` command: one-shot report of local state and upstream health.
pub async fn status(state: &AppState, json: bool) -> anyhow::Result<()> {
    let summaries = state.chat_service.list_conversations().await?;
    let message_count: u32 = {
        let mut total = 0;
        for summary in &summaries {
            total += state
                .chat_service
                .repo()
                .count_messages(&summary.id)
                .await?;
        }
        total
    };
    let upstream_ok = state.upstream.ping().await.is_ok();

    if json {
        let report = serde_json::json!({
            "data_dir": state.data_dir.display().to_string(),
            "conversations": summaries.len(),
            "messages": message_count,
            "upstream_url": state.config.upstream.base_url,
            "upstream_reachable": upstream_ok,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let check_mark = |ok: bool| {
        if ok {
            format!("{}", console::style("✓").green())
        } else {
            format!("{}", console::style("✗").red())
        }
    };

    println!();
    println!(
        "  {} chatrelay status",
        console::style("⚡").bold()
    );
    println!();
    println!(
        "  Data dir:       {}",
        console::style(state.data_dir.display()).cyan()
    );
    println!("  Conversations:  {}", summaries.len());
    println!("  Messages:       {message_count}");
    println!(
        "  {} Upstream {} ({})",
        check_mark(upstream_ok),
        if upstream_ok { "reachable" } else { "unreachable" },
        console::style(&state.config.upstream.base_url).dim()
    );
    println!();

    Ok(())
}
