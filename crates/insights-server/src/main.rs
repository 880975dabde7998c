//! insights-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), prepares the
//! data directory, opens the configured insight store, and serves the JSON
//! API over HTTP.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use insights_api::{InsightService, ServiceConfig};
use insights_core::store::InsightStore;
use insights_ingest::UploadDir;
use insights_llm::OpenRouterClient;
use insights_store_fs::FsInsightStore;
use insights_store_sqlite::SqliteInsightStore;
use settings::{API_KEY_VAR, Backend, ServerConfig};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "AI insights server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config)?;

  if cfg.llm.api_key.is_empty() {
    tracing::warn!(
      "no API key configured (set llm.api_key or {API_KEY_VAR}); generation \
       requests will fail"
    );
  }

  // Directory setup happens once, here.
  let uploads_dir = cfg.uploads_dir();
  let uploads = UploadDir::init(&uploads_dir)
    .with_context(|| format!("failed to create upload dir {uploads_dir:?}"))?;

  let generator = OpenRouterClient::new(cfg.llm.clone())
    .context("failed to build model client")?;

  match cfg.backend {
    Backend::Fs => {
      let dir = cfg.insights_dir();
      let store = FsInsightStore::open(&dir)
        .await
        .with_context(|| format!("failed to open insight dir {dir:?}"))?;
      serve(&cfg, store, generator, uploads).await
    }
    Backend::Sqlite => {
      let path = cfg.database_path();
      let store = SqliteInsightStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      serve(&cfg, store, generator, uploads).await
    }
  }
}

async fn serve<S>(
  cfg: &ServerConfig,
  store: S,
  generator: OpenRouterClient,
  uploads: UploadDir,
) -> anyhow::Result<()>
where
  S: InsightStore + 'static,
{
  let service = InsightService::new(
    Arc::new(store),
    Arc::new(generator),
    uploads,
    ServiceConfig {
      preview_rows: cfg.preview_rows,
      sample_rows:  cfg.sample_rows,
      persist:      cfg.persist,
      assembly:     cfg.assembly,
    },
  );
  let app = insights_api::app(Arc::new(service));
  let address = cfg.address();

  tracing::info!(
    backend = ?cfg.backend,
    data_dir = ?cfg.data_dir,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
