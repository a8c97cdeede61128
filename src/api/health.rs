use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::licensing::LicenseManager;

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    tier: &'static str,
}

pub async fn healthz(State(manager): State<Arc<LicenseManager>>) -> Json<Health> {
    Json(Health {
        status: "ok",
        tier: manager.current_tier().as_str(),
    })
}
