//! intervention-web-server: REST server for the intervention taxonomy.
//!
//! Reads config from env vars (a `.env` file is honoured):
//!   BIND_ADDR                    listen address (default: 0.0.0.0:3000)
//!   INTERVENTIONS_SHEET_BACKEND  google (default) or memory
//!   INTERVENTIONS_SHEET_ID       spreadsheet document id
//!   INTERVENTIONS_SHEET_NAME     target sheet title (default: Sheet1)
//!   GOOGLE_APPLICATION_CREDENTIALS_JSON / GOOGLE_APPLICATION_CREDENTIALS
//!                                service-account key, inline or as a path
//!   INTERVENTIONS_TAXONOMY_PATH  taxonomy YAML override

use anyhow::Context;
use intervention_taxonomy::api::{create_router, AppState};
use intervention_taxonomy::config::{AppConfig, SheetBackend};
use intervention_taxonomy::sheets::CredentialSource;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,intervention_web_server=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let catalog = config.load_catalog().context("failed to load taxonomy")?;
    info!(entries = catalog.len(), "taxonomy loaded");

    if config.sheet.backend == SheetBackend::Google
        && config.sheet.credentials == CredentialSource::Unset
    {
        warn!("no service-account credentials configured; appends will fail until they are set");
    }
    let sink = config
        .sheet
        .build_sink()
        .context("failed to create spreadsheet sink")?;
    info!(sink = %sink.describe(), "spreadsheet sink ready");

    let app = create_router(AppState::new(catalog, sink));

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("Starting server on {}", config.bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
