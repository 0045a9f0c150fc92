use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dossier::api::{create_router, AppState};
use dossier::config::Config;
use dossier::db::{Database, LibSqlBackend, StorageBackend};
use dossier::embeddings::EmbeddingProvider;
use dossier::llm::LlmProvider;
use dossier::models::IngestStatus;
use dossier::processing::DocumentFormat;

#[derive(Parser)]
#[command(name = "dossier")]
#[command(about = "Self-hostable document query service")]
struct Args {
    /// Store and ingest every supported file in this directory before serving
    #[arg(long)]
    ingest_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dossier=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Initializing database...");
    let db = Database::new(&config.database, config.embeddings.dimensions).await?;
    let db: Arc<dyn StorageBackend> = Arc::new(LibSqlBackend::new(db));

    tracing::info!(
        "Initializing embedding provider: {}...",
        config.embeddings.model
    );
    let embeddings = EmbeddingProvider::new(&config.embeddings)?;

    tracing::info!("Initializing LLM provider: {}...", config.llm.model);
    let llm = LlmProvider::new(&config.llm);

    let state = AppState::new(config.clone(), db, embeddings, llm);

    if let Some(dir) = args.ingest_dir.as_deref() {
        ingest_directory(&state, dir).await?;
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Dossier starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Batch mode: store and ingest every supported file in `dir`. Individual
/// file failures are logged and skipped so one bad document does not block
/// startup.
async fn ingest_directory(state: &AppState, dir: &Path) -> anyhow::Result<()> {
    tracing::info!(directory = %dir.display(), "Ingesting directory...");

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }

        let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if filename.starts_with('.') {
            continue;
        }
        if DocumentFormat::from_filename(&filename).is_none() {
            tracing::warn!(file = %filename, "Skipping unsupported file");
            continue;
        }

        let bytes = tokio::fs::read(entry.path()).await?;

        match state.pipeline.store_document(&filename, None, &bytes).await {
            Ok(stored) => {
                if stored.duplicate && stored.document.status == IngestStatus::Ingested {
                    tracing::info!(file = %filename, "Already ingested");
                    continue;
                }
                match state.pipeline.ingest(&stored.document.id).await {
                    Ok(count) => {
                        tracing::info!(file = %filename, chunks = count, "Ingested")
                    }
                    Err(e) => tracing::error!(file = %filename, error = %e, "Failed to ingest"),
                }
            }
            Err(e) => tracing::error!(file = %filename, error = %e, "Failed to store"),
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
