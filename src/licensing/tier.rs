use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Trial,
    Lite,
    Basic,
    Pro,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Trial, Tier::Lite, Tier::Basic, Tier::Pro];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Trial => "trial",
            Tier::Lite => "lite",
            Tier::Basic => "basic",
            Tier::Pro => "pro",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Trial => "Trial",
            Tier::Lite => "Lite",
            Tier::Basic => "Basic",
            Tier::Pro => "Pro",
        }
    }

    // Unknown strings yield None; callers fall back to Trial.
    pub fn parse(s: &str) -> Option<Tier> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trial" => Some(Tier::Trial),
            "lite" => Some(Tier::Lite),
            "basic" => Some(Tier::Basic),
            "pro" => Some(Tier::Pro),
            _ => None,
        }
    }

    pub fn info(self) -> TierInfo {
        TierInfo {
            tier: self,
            name: self.as_str(),
            label: self.label(),
            index: self.index(),
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct TierInfo {
    pub tier: Tier,
    pub name: &'static str,
    pub label: &'static str,
    pub index: usize,
}
