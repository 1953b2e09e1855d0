//! ideahub-server - idea-sharing web service
//!
//! Serves the JSON API over a directory-per-idea store. Startup order:
//! config, logging, data folder, optional seeding, then the HTTP listener.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ideahub_common::config::{self, TomlConfig};
use ideahub_common::credentials::StaticCredentials;
use ideahub_common::generator::{ContentGenerator, DisabledGenerator};
use ideahub_common::seed::seed_repository;
use ideahub_common::settings::SettingsStore;
use ideahub_common::{FsIdeaRepository, IdeaService};
use ideahub_server::generator::OpenAiGenerator;
use ideahub_server::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for ideahub-server
#[derive(Parser, Debug)]
#[command(name = "ideahub-server")]
#[command(about = "Idea-sharing web service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "IDEAHUB_PORT")]
    port: Option<u16>,

    /// Interface to bind
    #[arg(long, env = "IDEAHUB_BIND")]
    bind: Option<String>,

    /// Folder holding project_ideas/ and settings.json (env: IDEAHUB_DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "IDEAHUB_CONFIG")]
    config: Option<PathBuf>,

    /// Write the sample ideas into the store if their folders are absent
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config =
        config::load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;

    init_tracing(&toml_config);

    info!("Starting ideahub-server v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = config::resolve_data_dir(args.data_dir.as_deref(), &toml_config);
    info!("Data folder: {}", data_dir.display());

    let repo = FsIdeaRepository::new(config::ideas_dir(&data_dir));
    repo.ensure_root()
        .await
        .context("Failed to create idea store")?;
    let repo = Arc::new(repo);

    if args.seed {
        let written = seed_repository(repo.as_ref())
            .await
            .context("Failed to seed sample ideas")?;
        info!("Seeded {} sample idea(s)", written);
    }

    let generator: Arc<dyn ContentGenerator> = match config::resolve_api_key(&toml_config) {
        Some(key) => Arc::new(
            OpenAiGenerator::new(&toml_config.generator, key)
                .context("Failed to initialize generator")?,
        ),
        None => {
            warn!(
                "No generator API key found (set {} or [generator].api_key); AI generation disabled",
                config::API_KEY_ENV
            );
            Arc::new(DisabledGenerator)
        }
    };

    let service = IdeaService::new(
        repo,
        SettingsStore::new(config::settings_path(&data_dir)),
        Arc::new(StaticCredentials::builtin()),
        generator,
    );

    let state = AppState::new(service, toml_config.context_file.clone());
    let app = build_router(state);

    let bind = args
        .bind
        .unwrap_or_else(|| toml_config.bind_address().to_string());
    let port = args.port.unwrap_or_else(|| toml_config.port());
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("ideahub-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins over `[logging].level`
fn init_tracing(toml_config: &TomlConfig) {
    let level = &toml_config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "ideahub_server={level},ideahub_common={level},tower_http={level}"
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
