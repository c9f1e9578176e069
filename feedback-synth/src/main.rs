//! feedback-synth - 360 feedback collection and summary service
//!
//! Collects reviewer feedback for a subject, weights it by relationship and
//! collaboration frequency, and maintains one synthesized summary per
//! subject through a draft → finalised lifecycle.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use feedback_common::config::{
    database_path, ensure_root_folder, load_toml_config_or_default, resolve_root_folder,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use feedback_synth::config::{
    generation_timeout, resolve_api_key, GenerationSettings, DEFAULT_BIND_ADDRESS, DEFAULT_PORT,
};
use feedback_synth::services::{AnthropicClient, SummaryGenerator};
use feedback_synth::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "feedback-synth", version, about = "360 feedback summary service")]
struct Args {
    /// Root folder holding the database (overrides FEEDBACK_ROOT_FOLDER)
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// TOML config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, env = "FEEDBACK_PORT")]
    port: Option<u16>,

    #[arg(long, env = "FEEDBACK_BIND_ADDRESS")]
    bind: Option<String>,

    /// Seed demo subject and reviewers into an empty database
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = load_toml_config_or_default(args.config.as_deref());

    // RUST_LOG wins over the configured level
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!(
        "Starting feedback-synth v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    ensure_root_folder(&root_folder)
        .with_context(|| format!("Failed to initialize root folder {}", root_folder.display()))?;

    let db_path = database_path(&root_folder);
    info!("Database: {}", db_path.display());
    let db_pool = feedback_common::db::init_database(&db_path).await?;
    info!("Database connection established");

    if args.seed_demo {
        match feedback_synth::db::demo::seed_demo_data(&db_pool).await? {
            Some(subject_id) => info!(subject_id, "Demo data seeded"),
            None => info!("Demo seed skipped"),
        }
    }

    let api_key = resolve_api_key(&toml_config);
    let client = AnthropicClient::new(
        api_key,
        toml_config.generation.base_url.clone(),
        generation_timeout(&toml_config),
    )?;
    if !client.has_api_key() {
        warn!("Summary generation disabled until an API key is configured");
    }

    let settings = GenerationSettings::from_toml(&toml_config);
    info!(model = %settings.model, max_tokens = settings.max_tokens, "Generation settings");
    let generator = SummaryGenerator::new(Arc::new(client), settings);

    let state = AppState::new(db_pool, generator);
    let app = build_router(state);

    let bind = args
        .bind
        .or_else(|| toml_config.bind_address.clone())
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
