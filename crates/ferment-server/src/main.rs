//! Ferment Server - Main entry point

use anyhow::Result;
use ferment_common::logging::{init_logging, LogConfig};
use tracing::info;

use ferment_server::{
    api::{self, AppState},
    config::Config,
    db,
    storage::UploadArchive,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("ferment-server")
        .filter_directives("ferment_server=debug,ferment_ingest=info,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    info!("Starting Ferment Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let archive = UploadArchive::new(&config.ingest.upload_dir, config.ingest.archive_uploads);
    archive.ensure_root().await?;
    if archive.is_enabled() {
        info!(upload_dir = %archive.root().display(), "Archiving raw uploads");
    }

    api::serve(AppState { db: pool, archive }, config).await
}
