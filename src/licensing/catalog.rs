use serde::{Deserialize, Serialize};

use super::tier::Tier;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Core,
    Sales,
    Inventory,
    Purchasing,
    Accounting,
    Reporting,
    Administration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportsAccess {
    Basic,
    Standard,
    Full,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupFrequency {
    Manual,
    Daily,
    Hourly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportLevel {
    Community,
    Email,
    Priority,
}

// A missing field means the tier puts no cap on that resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Limitations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_products: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_customers: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_users: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sales_per_day: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bank_accounts: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_retention_days: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports_access: Option<ReportsAccess>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_frequency: Option<BackupFrequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_level: Option<SupportLevel>,
}

impl Limitations {
    pub const NONE: Limitations = Limitations {
        max_products: None,
        max_customers: None,
        max_users: None,
        max_sales_per_day: None,
        max_bank_accounts: None,
        data_retention_days: None,
        reports_access: None,
        backup_frequency: None,
        support_level: None,
    };
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct Feature {
    pub id: &'static str,
    pub category: Category,
    pub required_tier: Tier,
}

const fn feat(id: &'static str, category: Category, required_tier: Tier) -> Feature {
    Feature { id, category, required_tier }
}

pub const FEATURES: &[Feature] = &[
    feat("dashboard", Category::Core, Tier::Trial),
    feat("pos_basic", Category::Sales, Tier::Trial),
    feat("pos_advanced", Category::Sales, Tier::Pro),
    feat("products_management", Category::Inventory, Tier::Trial),
    feat("inventory_management", Category::Inventory, Tier::Lite),
    feat("customers_management", Category::Sales, Tier::Trial),
    feat("prescriptions", Category::Sales, Tier::Lite),
    feat("suppliers_management", Category::Purchasing, Tier::Basic),
    feat("purchases_management", Category::Purchasing, Tier::Basic),
    feat("accounting", Category::Accounting, Tier::Basic),
    feat("bank_accounts", Category::Accounting, Tier::Basic),
    feat("reports_basic", Category::Reporting, Tier::Lite),
    feat("reports_advanced", Category::Reporting, Tier::Pro),
    feat("multi_user", Category::Administration, Tier::Basic),
    feat("backup_restore", Category::Administration, Tier::Lite),
    feat("thermal_printing", Category::Sales, Tier::Trial),
];

pub fn feature(id: &str) -> Option<&'static Feature> {
    FEATURES.iter().find(|f| f.id == id)
}

// Unknown ids deny, never grant.
pub fn is_feature_available(id: &str, tier: Tier) -> bool {
    feature(id).map(|f| tier >= f.required_tier).unwrap_or(false)
}

// Caps applied while a session runs at `tier`. Tiers with no row are uncapped.
pub fn limitations(id: &str, tier: Tier) -> Option<Limitations> {
    let caps = match (id, tier) {
        ("pos_basic", Tier::Trial) => Limitations {
            max_products: Some(100),
            max_customers: Some(50),
            max_users: Some(1),
            max_sales_per_day: Some(20),
            max_bank_accounts: Some(1),
            data_retention_days: Some(30),
            reports_access: Some(ReportsAccess::Basic),
            backup_frequency: Some(BackupFrequency::Manual),
            support_level: Some(SupportLevel::Community),
        },
        ("pos_basic", Tier::Lite) => Limitations {
            max_sales_per_day: Some(200),
            data_retention_days: Some(365),
            ..Limitations::NONE
        },
        ("products_management", Tier::Trial) => Limitations {
            max_products: Some(100),
            ..Limitations::NONE
        },
        ("products_management", Tier::Lite) => Limitations {
            max_products: Some(2000),
            ..Limitations::NONE
        },
        ("customers_management", Tier::Trial) => Limitations {
            max_customers: Some(50),
            ..Limitations::NONE
        },
        ("customers_management", Tier::Lite) => Limitations {
            max_customers: Some(1000),
            ..Limitations::NONE
        },
        ("multi_user", Tier::Basic) => Limitations {
            max_users: Some(5),
            ..Limitations::NONE
        },
        ("bank_accounts", Tier::Basic) => Limitations {
            max_bank_accounts: Some(2),
            ..Limitations::NONE
        },
        ("reports_basic", Tier::Lite) => Limitations {
            reports_access: Some(ReportsAccess::Basic),
            data_retention_days: Some(90),
            ..Limitations::NONE
        },
        ("reports_basic", Tier::Basic) => Limitations {
            reports_access: Some(ReportsAccess::Standard),
            ..Limitations::NONE
        },
        ("backup_restore", Tier::Lite) => Limitations {
            backup_frequency: Some(BackupFrequency::Daily),
            ..Limitations::NONE
        },
        ("dashboard", Tier::Trial) => Limitations {
            support_level: Some(SupportLevel::Community),
            data_retention_days: Some(30),
            ..Limitations::NONE
        },
        _ => return None,
    };
    Some(caps)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Products,
    Customers,
    Users,
    SalesPerDay,
    BankAccounts,
}

impl Resource {
    fn noun(self) -> &'static str {
        match self {
            Resource::Products => "product",
            Resource::Customers => "customer",
            Resource::Users => "user",
            Resource::SalesPerDay => "daily sales",
            Resource::BankAccounts => "bank account",
        }
    }
}

// Callers report usage per resource; fields they do not track stay None.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UsageSnapshot {
    pub products: Option<u64>,
    pub customers: Option<u64>,
    pub users: Option<u64>,
    pub sales_today: Option<u64>,
    pub bank_accounts: Option<u64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LimitCheck {
    pub within_limits: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LimitCheck {
    fn ok() -> Self {
        LimitCheck {
            within_limits: true,
            resource: None,
            limit: None,
            usage: None,
            message: None,
        }
    }
}

// Caps are walked in a fixed order and the first violated one wins.
pub fn check_feature_limits(id: &str, tier: Tier, usage: &UsageSnapshot) -> LimitCheck {
    let Some(caps) = limitations(id, tier) else {
        return LimitCheck::ok();
    };
    let checks = [
        (Resource::Products, caps.max_products, usage.products),
        (Resource::Customers, caps.max_customers, usage.customers),
        (Resource::Users, caps.max_users, usage.users),
        (Resource::SalesPerDay, caps.max_sales_per_day, usage.sales_today),
        (Resource::BankAccounts, caps.max_bank_accounts, usage.bank_accounts),
    ];
    for (resource, cap, used) in checks {
        if let (Some(cap), Some(used)) = (cap, used) {
            if used >= cap {
                return LimitCheck {
                    within_limits: false,
                    resource: Some(resource),
                    limit: Some(cap),
                    usage: Some(used),
                    message: Some(format!(
                        "{} limit of {cap} reached (current usage {used})",
                        resource.noun()
                    )),
                };
            }
        }
    }
    LimitCheck::ok()
}
