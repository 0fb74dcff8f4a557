//! leadbook server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), overlaid with
//! `LEADBOOK_*` environment variables, connects to the backing sheet, and
//! serves the JSON gateway over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use leadbook_api::{AppState, ServerConfig};
use leadbook_scraper::{Discovery, UsageMeter};
use leadbook_store_sheets::{SheetStore, SheetsClient, SheetsConfig};
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "leadbook gateway server")]
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

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("LEADBOOK"))
    .build()
    .context("failed to read config")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Connect the sheet store.
  let client = SheetsClient::connect(SheetsConfig {
    spreadsheet_id:        server_cfg.spreadsheet_id.clone(),
    service_account_email: server_cfg.service_account_email.clone(),
    private_key:           server_cfg.private_key.clone(),
  })
  .await
  .context("failed to connect to the spreadsheet")?;
  let store = SheetStore::new(client);

  // Make sure the header row matches the canonical schema before any
  // encode-path write. Not fatal: the sheet may be reachable later.
  match store.ensure_header_row().await {
    Ok(true) => tracing::info!("sheet header row rewritten"),
    Ok(false) => {}
    Err(error) => tracing::warn!(%error, "header row check failed"),
  }

  let discovery = Discovery::new(server_cfg.places_api_key.clone())
    .context("failed to build discovery clients")?;

  // Build application state.
  let state = AppState {
    store:     Arc::new(store),
    config:    Arc::new(server_cfg.clone()),
    discovery: Arc::new(discovery),
    usage:     Arc::new(Mutex::new(UsageMeter::with_default_limit())),
  };

  let app = leadbook_api::router(state)
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
