use anyhow::Result;
use portfolio_store::{
    AppState, app,
    config::AppConfig,
    db,
    handlers::auth::AdminAuth,
    services::{content_service::ContentService, object_service::ObjectService, s3_backend::S3Backend},
};
use std::{io::ErrorKind, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting portfolio-store with config: {:?}", cfg);

    // --- Initialize SQLite connection ---
    let db = Arc::new(db::connect(&cfg.database_url).await?);

    // --- Schema is idempotent; `--migrate` only applies it and exits ---
    db::run_migrations(&db).await?;
    if migrate {
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Storage is checked per call; warn early so operators notice ---
    let missing = cfg.storage.missing();
    if !missing.is_empty() {
        tracing::warn!(
            "Object storage not configured (missing {}); uploads and signed URLs will fail",
            missing.join(", ")
        );
    }

    let admin = AdminAuth::new(cfg.admin_token.as_deref());
    if !admin.is_configured() {
        tracing::warn!("PORTFOLIO_ADMIN_TOKEN is not set; admin routes will reject every request");
    }

    // --- Initialize core services ---
    let backend = S3Backend::new(Duration::from_secs(cfg.storage.upload_timeout_secs));
    let state = AppState {
        content: ContentService::new(db.clone()),
        objects: ObjectService::new(cfg.storage.clone(), Arc::new(backend)),
        admin,
    };

    // --- Build router ---
    let app = app(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
