use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use portfolio_api::app::{build_router, AppState, Repositories};
use portfolio_api::auth::bootstrap::{ensure_admin, BootstrapOutcome};
use portfolio_api::auth::token::TokenService;
use portfolio_api::config::AppConfig;
use portfolio_api::db::mongo;
use portfolio_api::storage::client::LocalDiskStorage;

#[derive(Parser)]
#[command(name = "portfolio-api")]
#[command(about = "REST backend for a personal portfolio and blog")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Keep all data in memory instead of MongoDB
        #[arg(long)]
        ephemeral: bool,
    },
    /// Create the admin account from ADMIN_EMAIL / ADMIN_PASSWORD if none exists
    BootstrapAdmin,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_api=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command.unwrap_or(Command::Serve { ephemeral: false }) {
        Command::Serve { ephemeral } => serve(config, ephemeral).await,
        Command::BootstrapAdmin => bootstrap_admin(config).await,
    }
}

async fn bootstrap_admin(config: AppConfig) -> anyhow::Result<()> {
    let (email, password) = config
        .admin_credentials()
        .context("ADMIN_EMAIL and ADMIN_PASSWORD must be set")?;

    let repos = mongo::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    match ensure_admin(repos.admin_repo.as_ref(), email, password).await? {
        BootstrapOutcome::Created => println!("Admin account {} created", email.trim()),
        BootstrapOutcome::AlreadyProvisioned => println!("An admin account already exists"),
    }
    Ok(())
}

async fn serve(config: AppConfig, ephemeral: bool) -> anyhow::Result<()> {
    tracing::info!("Starting portfolio-api...");

    let repos = if ephemeral {
        tracing::warn!("Running with in-memory repositories, data is lost on exit");
        Repositories::in_memory()
    } else {
        mongo::connect(&config.mongodb_uri, &config.mongodb_database).await?
    };

    match config.admin_credentials() {
        Some((email, password)) => {
            ensure_admin(repos.admin_repo.as_ref(), email, password).await?;
        }
        None => tracing::warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping admin bootstrap"),
    }

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.upload_dir.display()))?;
    let storage = Arc::new(LocalDiskStorage::new(&config.upload_dir));
    tracing::info!("Serving uploads from {}", config.upload_dir.display());

    let state = AppState::new(repos, storage, TokenService::new(&config.jwt_secret));
    let app = build_router(state, &config.cors_origins(), &config.upload_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
