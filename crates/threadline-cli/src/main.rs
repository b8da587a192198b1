//! threadline CLI
//!
//! Commands:
//! - `create-message` — Store a new unread user message
//! - `history`        — Print a thread's messages
//! - `seed`           — Write fixture threads
//! - `summarize`      — Fold a thread's new messages into its memory
//! - `run`            — Run one agent turn inline

use clap::{Parser, Subcommand};

use threadline_api::Config;

mod commands;
mod seeds;

#[derive(Parser)]
#[command(name = "threadline", about = "threadline operator tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an unread user message, creating the thread when no id is given
    CreateMessage {
        /// Message content
        #[arg(short, long)]
        message: String,

        /// Existing thread to post into
        #[arg(short, long)]
        thread_id: Option<String>,

        /// Owner of a newly created thread
        #[arg(short, long, default_value = "default-user")]
        user_id: String,
    },

    /// Print the messages of a thread
    History {
        thread_id: String,
    },

    /// Write a named fixture thread (`all` writes every fixture)
    Seed {
        #[arg(default_value = "all")]
        name: String,

        /// List available fixtures
        #[arg(short, long)]
        list: bool,
    },

    /// Run memory compaction once for a thread
    Summarize {
        thread_id: String,
    },

    /// Run one agent turn for a thread and print the outcome
    Run {
        thread_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    if let Commands::Seed { list: true, .. } = cli.command {
        commands::seed::list();
        return Ok(());
    }

    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    match cli.command {
        Commands::CreateMessage {
            message,
            thread_id,
            user_id,
        } => commands::create_message::run(&config, &message, thread_id, &user_id).await?,
        Commands::History { thread_id } => commands::history::run(&config, &thread_id).await?,
        Commands::Seed { name, .. } => commands::seed::run(&config, &name).await?,
        Commands::Summarize { thread_id } => commands::summarize::run(&config, &thread_id).await?,
        Commands::Run { thread_id } => commands::run::run(&config, &thread_id).await?,
    }

    Ok(())
}
