use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ApiError;
use crate::licensing::catalog::{feature, Feature, LimitCheck, Limitations, UsageSnapshot};
use crate::licensing::manager::{LicenseStatus, PageAccess, UpgradeSuggestion};
use crate::licensing::routes::component_features;
use crate::licensing::tier::Tier;
use crate::licensing::LicenseManager;

pub async fn status(State(manager): State<Arc<LicenseManager>>) -> Json<LicenseStatus> {
    Json(manager.current_status())
}

#[derive(Serialize)]
pub struct FeatureListing {
    pub tier: Tier,
    pub available: Vec<&'static Feature>,
    pub blocked: Vec<&'static Feature>,
}

pub async fn features(State(manager): State<Arc<LicenseManager>>) -> Json<FeatureListing> {
    Json(FeatureListing {
        tier: manager.current_tier(),
        available: manager.available_features(),
        blocked: manager.blocked_features(),
    })
}

#[derive(Serialize)]
pub struct FeatureDetail {
    #[serde(flatten)]
    pub feature: Feature,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limitations: Option<Limitations>,
}

pub async fn feature_detail(
    State(manager): State<Arc<LicenseManager>>,
    Path(id): Path<String>,
) -> Result<Json<FeatureDetail>, ApiError> {
    let feature = *feature(&id).ok_or(ApiError::UnknownFeature(id))?;
    Ok(Json(FeatureDetail {
        enabled: manager.is_feature_enabled(feature.id),
        limitations: manager.feature_limitations(feature.id),
        feature,
    }))
}

pub async fn feature_limits(
    State(manager): State<Arc<LicenseManager>>,
    Path(id): Path<String>,
    Json(usage): Json<UsageSnapshot>,
) -> Json<LimitCheck> {
    Json(manager.check_feature_limits(&id, &usage))
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub route: String,
}

pub async fn page_access(
    State(manager): State<Arc<LicenseManager>>,
    Query(query): Query<PageQuery>,
) -> Json<PageAccess> {
    Json(manager.validate_page_access(&query.route))
}

#[derive(Serialize)]
pub struct ComponentAccess {
    pub component: String,
    pub allowed: bool,
    pub required_features: Vec<&'static str>,
}

pub async fn component_access(
    State(manager): State<Arc<LicenseManager>>,
    Path(name): Path<String>,
) -> Json<ComponentAccess> {
    Json(ComponentAccess {
        allowed: manager.can_render_component(&name),
        required_features: component_features(&name).to_vec(),
        component: name,
    })
}

pub async fn upgrade(
    State(manager): State<Arc<LicenseManager>>,
    Path(id): Path<String>,
) -> Result<Json<UpgradeSuggestion>, ApiError> {
    manager
        .upgrade_suggestions(&id)
        .map(Json)
        .ok_or(ApiError::UnknownFeature(id))
}

pub async fn refresh(State(manager): State<Arc<LicenseManager>>) -> Json<LicenseStatus> {
    manager.force_refresh().await;
    Json(manager.current_status())
}
