use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::catalog::{
    check_feature_limits, feature, is_feature_available, limitations, Feature, LimitCheck,
    Limitations, UsageSnapshot, FEATURES,
};
use super::resolver::resolve_tier;
use super::routes::{
    can_render_component, canonicalize, is_page_accessible, route_features,
};
use super::tier::{Tier, TierInfo};
use super::validator::LicenseValidator;

#[derive(Clone)]
struct LicenseState {
    tier: Tier,
    status: String,
    refreshed_at: Option<OffsetDateTime>,
    initialized: bool,
}

// Holds the one piece of mutable state in the licensing layer. Refresh is a
// full replace, so plain lock-guarded assignment is enough.
pub struct LicenseManager {
    validator: Arc<dyn LicenseValidator>,
    state: RwLock<LicenseState>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LicenseStatus {
    #[serde(flatten)]
    pub tier: TierInfo,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PageAccess {
    pub route: String,
    pub allowed: bool,
    pub required_features: Vec<&'static str>,
    pub missing_features: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_tier: Option<Tier>,
}

#[derive(Clone, Debug, Serialize)]
pub struct UpgradeSuggestion {
    pub feature_id: &'static str,
    pub current_tier: Tier,
    pub suggested_tier: Tier,
    pub already_available: bool,
    pub unlocked_features: Vec<&'static str>,
}

impl LicenseManager {
    pub fn new(validator: Arc<dyn LicenseValidator>) -> Self {
        Self {
            validator,
            state: RwLock::new(LicenseState {
                tier: Tier::Trial,
                status: "uninitialized".to_string(),
                refreshed_at: None,
                initialized: false,
            }),
        }
    }

    fn read(&self) -> LicenseState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, tier: Tier, status: String) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *guard = LicenseState {
            tier,
            status,
            refreshed_at: Some(OffsetDateTime::now_utc()),
            initialized: true,
        };
    }

    // First call runs the validator; later calls are no-ops.
    pub async fn initialize(&self) -> Tier {
        if self.read().initialized {
            return self.current_tier();
        }
        self.force_refresh().await
    }

    // Validator failure or an invalid license both land on Trial; callers of
    // the check functions never see an error.
    pub async fn force_refresh(&self) -> Tier {
        let (tier, status) = match self.validator.validate().await {
            Ok(outcome) if outcome.valid => {
                let details = outcome.details.unwrap_or_default();
                (resolve_tier(&details), outcome.status)
            }
            Ok(outcome) => {
                tracing::warn!(status = %outcome.status, "license invalid, falling back to trial");
                (Tier::Trial, outcome.status)
            }
            Err(err) => {
                tracing::warn!(error = %err, "license validation failed, falling back to trial");
                (Tier::Trial, "validation_failed".to_string())
            }
        };
        self.store(tier, status);
        tracing::info!(tier = %tier, "license tier refreshed");
        tier
    }

    pub fn current_tier(&self) -> Tier {
        self.read().tier
    }

    pub fn current_status(&self) -> LicenseStatus {
        let state = self.read();
        LicenseStatus {
            tier: state.tier.info(),
            status: state.status,
            refreshed_at: state
                .refreshed_at
                .and_then(|t| t.format(&Rfc3339).ok()),
        }
    }

    pub fn is_feature_enabled(&self, id: &str) -> bool {
        is_feature_available(id, self.current_tier())
    }

    pub fn can_access_page(&self, route: &str) -> bool {
        is_page_accessible(route, self.current_tier())
    }

    pub fn can_render_component(&self, name: &str) -> bool {
        can_render_component(name, self.current_tier())
    }

    pub fn feature_limitations(&self, id: &str) -> Option<Limitations> {
        limitations(id, self.current_tier())
    }

    pub fn available_features(&self) -> Vec<&'static Feature> {
        let tier = self.current_tier();
        FEATURES.iter().filter(|f| tier >= f.required_tier).collect()
    }

    pub fn blocked_features(&self) -> Vec<&'static Feature> {
        let tier = self.current_tier();
        FEATURES.iter().filter(|f| tier < f.required_tier).collect()
    }

    pub fn check_feature_limits(&self, id: &str, usage: &UsageSnapshot) -> LimitCheck {
        check_feature_limits(id, self.current_tier(), usage)
    }

    pub fn upgrade_suggestions(&self, id: &str) -> Option<UpgradeSuggestion> {
        let feature = feature(id)?;
        let current = self.current_tier();
        let suggested = feature.required_tier;
        let unlocked = FEATURES
            .iter()
            .filter(|f| suggested >= f.required_tier && current < f.required_tier)
            .map(|f| f.id)
            .collect();
        Some(UpgradeSuggestion {
            feature_id: feature.id,
            current_tier: current,
            suggested_tier: suggested,
            already_available: current >= suggested,
            unlocked_features: unlocked,
        })
    }

    pub fn validate_page_access(&self, route: &str) -> PageAccess {
        let tier = self.current_tier();
        let required = route_features(route);
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|id| !is_feature_available(id, tier))
            .copied()
            .collect();
        let allowed = required.is_empty() || missing.len() < required.len();
        // Cheapest unlock: the lowest required tier among the mapped features.
        let suggested_tier = if allowed {
            None
        } else {
            required
                .iter()
                .filter_map(|id| feature(id))
                .map(|f| f.required_tier)
                .min()
        };
        PageAccess {
            route: canonicalize(route),
            allowed,
            required_features: required.to_vec(),
            missing_features: missing,
            suggested_tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::licensing::resolver::LicenseDetails;
    use crate::licensing::validator::ValidationOutcome;
    use anyhow::anyhow;
    use futures_util::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubValidator {
        outcome: Mutex<Option<ValidationOutcome>>,
        calls: AtomicUsize,
    }

    impl StubValidator {
        fn returning(outcome: ValidationOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome: Mutex::new(Some(outcome)),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                outcome: Mutex::new(None),
                calls: AtomicUsize::new(0),
            })
        }

        fn set(&self, outcome: ValidationOutcome) {
            *self.outcome.lock().unwrap() = Some(outcome);
        }
    }

    impl LicenseValidator for StubValidator {
        fn validate(&self) -> BoxFuture<'_, anyhow::Result<ValidationOutcome>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                match self.outcome.lock().unwrap().clone() {
                    Some(outcome) => Ok(outcome),
                    None => Err(anyhow!("validator unreachable")),
                }
            })
        }
    }

    fn keyed(key: &str) -> ValidationOutcome {
        ValidationOutcome {
            valid: true,
            status: "active".to_string(),
            details: Some(LicenseDetails {
                key: Some(key.to_string()),
                ..Default::default()
            }),
        }
    }

    fn manager_at(key: &str) -> (LicenseManager, Arc<StubValidator>) {
        let stub = StubValidator::returning(keyed(key));
        (LicenseManager::new(stub.clone()), stub)
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let (mgr, stub) = manager_at("BASIC_1");
        mgr.initialize().await;
        mgr.initialize().await;
        mgr.initialize().await;
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        assert_eq!(mgr.current_tier(), Tier::Basic);
    }

    #[tokio::test]
    async fn validator_failure_lands_on_trial() {
        let mgr = LicenseManager::new(StubValidator::failing());
        mgr.initialize().await;
        assert_eq!(mgr.current_tier(), Tier::Trial);
        assert_eq!(mgr.current_status().status, "validation_failed");
    }

    #[tokio::test]
    async fn invalid_license_lands_on_trial() {
        let stub = StubValidator::returning(ValidationOutcome::invalid("expired"));
        let mgr = LicenseManager::new(stub);
        mgr.initialize().await;
        assert_eq!(mgr.current_tier(), Tier::Trial);
        assert_eq!(mgr.current_status().status, "expired");
    }

    #[tokio::test]
    async fn force_refresh_picks_up_a_new_tier() {
        let (mgr, stub) = manager_at("LITE_1");
        mgr.initialize().await;
        assert_eq!(mgr.current_tier(), Tier::Lite);
        stub.set(keyed("PRO_1"));
        mgr.force_refresh().await;
        assert_eq!(mgr.current_tier(), Tier::Pro);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn uninitialized_manager_answers_as_trial() {
        let (mgr, _) = manager_at("PRO_1");
        assert_eq!(mgr.current_tier(), Tier::Trial);
        assert!(!mgr.is_feature_enabled("purchases_management"));
        assert!(mgr.is_feature_enabled("dashboard"));
    }

    #[tokio::test]
    async fn available_and_blocked_partition_the_catalog() {
        for key in ["TRIAL_1", "LITE_1", "BASIC_1", "PRO_1"] {
            let (mgr, _) = manager_at(key);
            mgr.initialize().await;
            let available = mgr.available_features();
            let blocked = mgr.blocked_features();
            assert_eq!(available.len() + blocked.len(), FEATURES.len());
            for f in &available {
                assert!(!blocked.iter().any(|b| b.id == f.id));
            }
        }
    }

    #[tokio::test]
    async fn pro_blocks_nothing() {
        let (mgr, _) = manager_at("PRO_1");
        mgr.initialize().await;
        assert!(mgr.blocked_features().is_empty());
    }

    #[tokio::test]
    async fn page_validation_reports_missing_features() {
        let (mgr, _) = manager_at("TRIAL_1");
        mgr.initialize().await;
        let access = mgr.validate_page_access("/purchases");
        assert!(!access.allowed);
        assert_eq!(access.route, "purchases");
        assert_eq!(access.required_features, vec!["purchases_management"]);
        assert_eq!(access.missing_features, vec!["purchases_management"]);
        assert_eq!(access.suggested_tier, Some(Tier::Basic));
    }

    #[tokio::test]
    async fn page_validation_allows_public_routes() {
        let (mgr, _) = manager_at("TRIAL_1");
        mgr.initialize().await;
        let access = mgr.validate_page_access("/settings");
        assert!(access.allowed);
        assert!(access.required_features.is_empty());
        assert_eq!(access.suggested_tier, None);
    }

    #[tokio::test]
    async fn one_satisfied_feature_opens_a_multi_feature_page() {
        let (mgr, _) = manager_at("LITE_1");
        mgr.initialize().await;
        let access = mgr.validate_page_access("/reports");
        assert!(access.allowed);
        assert_eq!(access.missing_features, vec!["reports_advanced"]);
    }

    #[tokio::test]
    async fn upgrade_suggestion_lists_newly_unlocked_features() {
        let (mgr, _) = manager_at("TRIAL_1");
        mgr.initialize().await;
        let suggestion = mgr.upgrade_suggestions("purchases_management").unwrap();
        assert_eq!(suggestion.suggested_tier, Tier::Basic);
        assert!(!suggestion.already_available);
        assert!(suggestion.unlocked_features.contains(&"purchases_management"));
        assert!(suggestion.unlocked_features.contains(&"accounting"));
        assert!(suggestion.unlocked_features.contains(&"inventory_management"));
        assert!(!suggestion.unlocked_features.contains(&"dashboard"));
        assert!(!suggestion.unlocked_features.contains(&"reports_advanced"));
    }

    #[tokio::test]
    async fn upgrade_suggestion_for_available_feature_is_empty() {
        let (mgr, _) = manager_at("PRO_1");
        mgr.initialize().await;
        let suggestion = mgr.upgrade_suggestions("dashboard").unwrap();
        assert!(suggestion.already_available);
        assert!(suggestion.unlocked_features.is_empty());
    }

    #[tokio::test]
    async fn upgrade_suggestion_for_unknown_feature_is_none() {
        let (mgr, _) = manager_at("TRIAL_1");
        mgr.initialize().await;
        assert!(mgr.upgrade_suggestions("nonexistent-id").is_none());
    }

    #[tokio::test]
    async fn limit_check_runs_against_the_current_tier() {
        let (mgr, _) = manager_at("TRIAL_1");
        mgr.initialize().await;
        let usage = UsageSnapshot {
            sales_today: Some(20),
            ..Default::default()
        };
        let check = mgr.check_feature_limits("pos_basic", &usage);
        assert!(!check.within_limits);
        assert_eq!(check.limit, Some(20));
    }

    #[tokio::test]
    async fn status_carries_refresh_timestamp() {
        let (mgr, _) = manager_at("BASIC_1");
        assert!(mgr.current_status().refreshed_at.is_none());
        mgr.initialize().await;
        let status = mgr.current_status();
        assert_eq!(status.status, "active");
        assert!(status.refreshed_at.is_some());
    }
}
