use std::sync::Arc;

use axum::extract::FromRef;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::{config::AppConfig, licensing::LicenseManager};

#[derive(Clone)]
pub struct AppState {
    pub cfg: AppConfig,
    pub manager: Arc<LicenseManager>,
}

impl AppState {
    pub fn new(cfg: AppConfig, manager: Arc<LicenseManager>) -> Self {
        Self { cfg, manager }
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(s: &AppState) -> AppConfig { s.cfg.clone() }
}
impl FromRef<AppState> for Arc<LicenseManager> {
    fn from_ref(s: &AppState) -> Arc<LicenseManager> { s.manager.clone() }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown feature '{0}'")]
    UnknownFeature(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::UnknownFeature(_) => StatusCode::NOT_FOUND,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

pub mod health;
pub mod license;
