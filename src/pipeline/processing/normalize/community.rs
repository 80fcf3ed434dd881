use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::{HSINCHU_DISTRICTS, UNCATEGORIZED_COMMUNITY};

// Leading county/city and district, e.g. "新竹市" + "東區"
static ADMIN_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\p{Han}{1,3}?[縣市])?(\p{Han}{1,3}?[區鄉鎮市])?").expect("valid prefix pattern")
});

// Applied after the administrative prefix is stripped; the run may contain
// 區/鎮/市 (光鎮里) but never crosses another 里 or a road name
static LI_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{4E00}-\x{9FFF}&&[^里路街]]{1,6}里").expect("valid 里 pattern")
});

static QU_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{4E00}-\x{9FFF}&&[^市縣區鄉鎮里路街]]{1,6}區").expect("valid 區 pattern")
});

/// Suffix rules tried in order against an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunityRule {
    /// Neighbourhood (`里`)
    Li,
    /// District (`區`)
    Qu,
}

impl CommunityRule {
    /// Leftmost match of this rule in `address`
    pub fn find<'a>(&self, address: &'a str) -> Option<&'a str> {
        match self {
            CommunityRule::Li => find_li(address),
            CommunityRule::Qu => QU_PATTERN.find(address).map(|m| m.as_str()),
        }
    }
}

/// Search for a 里 after the full prefix, then after the county alone, then
/// from the start, so a district match that ate part of the 里 name is undone
fn find_li(address: &str) -> Option<&str> {
    let mut starts = Vec::with_capacity(3);
    if let Some(caps) = ADMIN_PREFIX.captures(address) {
        if let Some(full) = caps.get(0) {
            starts.push(full.end());
        }
        if let Some(county) = caps.get(1) {
            starts.push(county.end());
        }
    }
    starts.push(0);
    starts.dedup();

    starts
        .into_iter()
        .find_map(|start| LI_PATTERN.find(&address[start..]).map(|m| m.as_str()))
}

pub fn default_rules() -> Vec<CommunityRule> {
    vec![CommunityRule::Li, CommunityRule::Qu]
}

/// Derives a community label from an address, falling back to the district
#[derive(Debug, Clone)]
pub struct CommunityResolver {
    rules: Vec<CommunityRule>,
    districts: HashMap<String, String>,
    sentinel: String,
}

impl Default for CommunityResolver {
    fn default() -> Self {
        Self::new(default_rules(), default_districts(), UNCATEGORIZED_COMMUNITY)
    }
}

impl CommunityResolver {
    pub fn new(
        rules: Vec<CommunityRule>,
        districts: HashMap<String, String>,
        sentinel: &str,
    ) -> Self {
        let sentinel = match sentinel.trim() {
            "" => UNCATEGORIZED_COMMUNITY.to_string(),
            s => s.to_string(),
        };
        Self { rules, districts, sentinel }
    }

    /// Resolve a community label. Never returns an empty string.
    pub fn resolve(&self, address: &str, district_code: &str) -> String {
        if let Some(found) = self.rules.iter().find_map(|rule| rule.find(address)) {
            return found.to_string();
        }

        let code = district_code.trim();
        if code.is_empty() {
            return self.sentinel.clone();
        }
        self.districts
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }
}

pub fn default_districts() -> HashMap<String, String> {
    HSINCHU_DISTRICTS
        .iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect()
}
