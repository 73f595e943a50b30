mod commands;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use feedrelay_core::Config;
use feedrelay_storage::StorageBackend;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "feedrelay")]
#[command(about = "Relays new RSS entries and their download links to Telegram", long_about = None)]
struct Cli {
    /// Keep everything in memory instead of PostgreSQL
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the poll scheduler, queue processor and admin API
    Serve {
        #[arg(short, long, default_value = "38080")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Poll the feed once and process every task it produces
    Poll,
    Stats,
    Recent {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Download links stored for one feed entry
    Links { feed_link: String },
    /// Move dead-lettered tasks back to pending
    RetryFailed,
    /// Send a message straight to the configured chat
    Notify { message: String },
}

async fn open_storage(config: &Config, ephemeral: bool) -> Result<Arc<StorageBackend>> {
    if ephemeral {
        tracing::info!("Using in-memory storage, nothing will be persisted");
        return Ok(Arc::new(StorageBackend::new_memory()));
    }
    let url = config.database_url.as_deref().ok_or_else(|| {
        anyhow::anyhow!("DATABASE_URL or POSTGRES_* must be set (or pass --ephemeral)")
    })?;
    Ok(Arc::new(StorageBackend::new_postgres(url).await?))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Serve { port, host } => {
            let storage = open_storage(&config, cli.ephemeral).await?;
            commands::serve::run(&config, storage, &host, port).await?;
        },
        Commands::Poll => {
            let storage = open_storage(&config, cli.ephemeral).await?;
            commands::pipeline::run_poll(&config, storage).await?;
        },
        Commands::Stats => {
            let storage = open_storage(&config, cli.ephemeral).await?;
            commands::query::run_stats(storage).await?;
        },
        Commands::Recent { limit } => {
            let storage = open_storage(&config, cli.ephemeral).await?;
            commands::query::run_recent(storage, limit).await?;
        },
        Commands::Links { feed_link } => {
            let storage = open_storage(&config, cli.ephemeral).await?;
            commands::query::run_links(storage, &feed_link).await?;
        },
        Commands::RetryFailed => {
            let storage = open_storage(&config, cli.ephemeral).await?;
            commands::query::run_retry_failed(storage).await?;
        },
        Commands::Notify { message } => {
            commands::pipeline::run_notify(&config, &message).await?;
        },
    }

    Ok(())
}
