use serde::{Deserialize, Serialize};

use super::tier::Tier;

// The validator's `details` object. Unknown fields are ignored so payload
// shape drift never breaks tier resolution.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LicenseDetails {
    pub meta: Option<LicenseMeta>,
    pub key: Option<String>,
    pub subscription: Option<Subscription>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LicenseMeta {
    pub tier: Option<String>,
    pub customer: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Subscription {
    pub product: Option<Product>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Product {
    pub name: Option<String>,
}

const KEY_PREFIXES: &[(&str, Tier)] = &[
    ("PRO_", Tier::Pro),
    ("BASIC_", Tier::Basic),
    ("LITE_", Tier::Lite),
    ("TRIAL_", Tier::Trial),
];

const PRODUCT_MARKERS: &[(&str, Tier)] = &[
    ("PRO", Tier::Pro),
    ("BASIC", Tier::Basic),
    ("LITE", Tier::Lite),
];

// First match wins; anything unrecognized falls through to Trial.
pub fn resolve_tier(details: &LicenseDetails) -> Tier {
    if let Some(tier) = details
        .meta
        .as_ref()
        .and_then(|m| m.tier.as_deref())
        .and_then(Tier::parse)
    {
        return tier;
    }
    if let Some(key) = details.key.as_deref() {
        for (prefix, tier) in KEY_PREFIXES {
            if key.starts_with(prefix) {
                return *tier;
            }
        }
    }
    if let Some(name) = details
        .subscription
        .as_ref()
        .and_then(|s| s.product.as_ref())
        .and_then(|p| p.name.as_deref())
    {
        let upper = name.to_ascii_uppercase();
        for (marker, tier) in PRODUCT_MARKERS {
            if upper.contains(marker) {
                return *tier;
            }
        }
    }
    Tier::Trial
}
