mod config;
mod error;
mod mcp;
mod render;
mod storage;
mod web;

use std::sync::Arc;
use std::time::Instant;

use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use plant_common::classifier::{Classifier, OfflineClassifier};
use plant_common::diagnosis::Diagnoser;

use config::{Config, Mode};
use mcp::PlantDoctorServer;
use storage::UploadStore;
use web::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries MCP JSON-RPC in mcp mode
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting plant-doctor");

    let config = Config::from_env()?;
    info!(
        mode = ?config.mode,
        upload_dir = %config.upload_dir.display(),
        catalog_override = config.catalog_path.is_some(),
        faq_override = config.faq_path.is_some(),
        "configuration loaded"
    );

    let catalog = Arc::new(config.load_catalog()?);
    let faq = Arc::new(config.load_faq()?);
    info!(
        diseases = catalog.len(),
        faq_entries = faq.len(),
        "knowledge base loaded"
    );
    let extra = catalog.extra_labels();
    if !extra.is_empty() {
        tracing::warn!(labels = ?extra, "catalog has records no classifier label maps to");
    }

    match config.mode {
        Mode::Mcp => {
            let server = PlantDoctorServer::new(catalog, faq);

            info!("MCP server ready, serving on stdio");
            let service = server.serve(stdio()).await.inspect_err(|e| {
                tracing::error!(error = %e, "MCP server error");
            })?;
            service.waiting().await?;
            info!("MCP server shut down");
        }
        Mode::Http => {
            let classifier: Arc<dyn Classifier> = Arc::new(OfflineClassifier);
            info!(classifier = classifier.name(), "classifier configured");

            let store = UploadStore::open(&config.upload_dir).await?;
            let state = AppState {
                diagnoser: Arc::new(Diagnoser::new(Arc::clone(&catalog), classifier)),
                catalog,
                faq,
                store,
                start_time: Instant::now(),
            };

            web::run(state, &config.host, config.port, config.max_upload_bytes).await?;
            info!("web server shut down");
        }
    }
    Ok(())
}
