//! LearnLens server binary
//!
//! Opens (and migrates) the SQLite database, seeds sample data on first run,
//! and serves the analytics API over HTTP.

mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use learnlens_core::config::Config;
use learnlens_core::llm::LlmClient;
use learnlens_core::service::{AnalyticsService, TurnHistory};
use learnlens_core::storage::{seed, Database, DatabaseConfig};

use routes::AppState;

#[derive(Parser)]
#[command(name = "learnlens")]
#[command(author, version, about = "Badge enrollment analytics service", long_about = None)]
struct Cli {
    /// Address to bind (overrides the configured host)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides the configured port)
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database path (defaults to the platform data directory)
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Skip sample data seeding on an empty database
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("learnlens=info,learnlens_core=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;

    let host = cli.host.unwrap_or_else(|| config.server.host.clone());
    let port = cli.port.unwrap_or(config.server.port);

    let db_config = match &cli.database {
        Some(path) => DatabaseConfig::with_path(path),
        None => DatabaseConfig::default(),
    };
    let db = Database::new(db_config)
        .await
        .context("Failed to open database")?;
    info!(path = %db.path().display(), "Database ready");

    if cli.no_seed {
        info!("Sample data seeding disabled");
    } else if seed::seed_sample_data(&db).await? {
        info!("Seeded sample data into empty database");
    }

    let api_key = config
        .llm
        .resolved_api_key()?
        .context("No API key found. Set LEARNLENS_API_KEY or OPENAI_API_KEY.")?;
    if let Some(redacted) = config.llm.redacted_api_key()? {
        info!(key = %redacted, model = %config.llm.model, "LLM client configured");
    }

    let llm = LlmClient::new(config.llm.clone(), api_key)?;
    let service = AnalyticsService::new(db, llm);
    let history = TurnHistory::new(config.history.max_turns);
    let state = Arc::new(AppState::new(service, history));

    let app = routes::router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Listening");

    if host == "0.0.0.0" {
        warn!("Binding all interfaces; put a reverse proxy in front for production use");
    }

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
