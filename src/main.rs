mod api;
mod config;
mod licensing;

use axum::{routing::{get, post}, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).compact().init();

    let cfg = config::AppConfig::from_env()?;
    let validator = licensing::EnvLicenseValidator::from_config(&cfg)?;
    let manager = Arc::new(licensing::LicenseManager::new(Arc::new(validator)));
    manager.initialize().await;
    let shared = api::AppState::new(cfg.clone(), manager);

    let app = Router::new()
        .route("/api/healthz", get(api::health::healthz))
        .route("/api/license/status", get(api::license::status))
        .route("/api/license/features", get(api::license::features))
        .route("/api/license/features/:id", get(api::license::feature_detail))
        .route("/api/license/features/:id/limits", post(api::license::feature_limits))
        .route("/api/license/pages", get(api::license::page_access))
        .route("/api/license/components/:name", get(api::license::component_access))
        .route("/api/license/upgrade/:id", get(api::license::upgrade))
        .route("/api/license/refresh", post(api::license::refresh))
        .with_state(shared)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = cfg.bind_addr.parse()?;
    tracing::info!(%addr, "medix-license starting");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
