use super::catalog::is_feature_available;
use super::tier::Tier;

// Canonical form: lowercase, no surrounding slashes. The bare root and the
// dashboard page are the same screen in the UI router.
const ALIASES: &[(&str, &str)] = &[("", "dashboard")];

pub fn canonicalize(route: &str) -> String {
    let key = route.trim().trim_matches('/').to_ascii_lowercase();
    for (from, to) in ALIASES {
        if key == *from {
            return (*to).to_string();
        }
    }
    key
}

const ROUTE_FEATURES: &[(&str, &[&str])] = &[
    ("dashboard", &["dashboard"]),
    ("pos", &["pos_basic", "pos_advanced"]),
    ("products", &["products_management"]),
    ("inventory", &["inventory_management"]),
    ("customers", &["customers_management"]),
    ("purchases", &["purchases_management"]),
    ("suppliers", &["suppliers_management", "purchases_management"]),
    ("prescriptions", &["prescriptions"]),
    ("accounting", &["accounting", "bank_accounts"]),
    ("reports", &["reports_basic", "reports_advanced"]),
    ("settings/users", &["multi_user"]),
];

const COMPONENT_FEATURES: &[(&str, &[&str])] = &[
    ("SalesChart", &["dashboard"]),
    ("PurchaseOrderForm", &["purchases_management"]),
    ("AdvancedReportPanel", &["reports_advanced"]),
    ("UserManagementPanel", &["multi_user"]),
    ("BackupButton", &["backup_restore"]),
    ("PrintReceiptButton", &["thermal_printing"]),
];

pub fn route_features(route: &str) -> &'static [&'static str] {
    let key = canonicalize(route);
    ROUTE_FEATURES
        .iter()
        .find(|(r, _)| *r == key)
        .map(|(_, feats)| *feats)
        .unwrap_or(&[])
}

// Routes with no declared requirement are public; otherwise any one
// available feature unlocks the page.
pub fn is_page_accessible(route: &str, tier: Tier) -> bool {
    let feats = route_features(route);
    feats.is_empty() || feats.iter().any(|id| is_feature_available(id, tier))
}

pub fn component_features(name: &str) -> &'static [&'static str] {
    COMPONENT_FEATURES
        .iter()
        .find(|(c, _)| *c == name)
        .map(|(_, feats)| *feats)
        .unwrap_or(&[])
}

pub fn can_render_component(name: &str, tier: Tier) -> bool {
    let feats = component_features(name);
    feats.is_empty() || feats.iter().any(|id| is_feature_available(id, tier))
}
