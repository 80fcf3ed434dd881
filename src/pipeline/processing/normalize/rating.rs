use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::Rating;

const SYNTHETIC_BASE: f64 = 3.2;
const SYNTHETIC_SPREAD: u32 = 180;
const MAX_RATING: f64 = 5.0;

/// Offline rating used before (or instead of) any lookup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingPolicy {
    /// No rating until a lookup provides one
    #[default]
    None,
    /// Placeholder computed from the clinic name, tagged as synthetic
    Synthetic,
}

impl RatingPolicy {
    pub fn offline_rating(&self, name: &str) -> Option<Rating> {
        match self {
            RatingPolicy::None => None,
            RatingPolicy::Synthetic => Some(Rating::synthetic(synthetic_rating(name))),
        }
    }
}

impl FromStr for RatingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(RatingPolicy::None),
            "synthetic" => Ok(RatingPolicy::Synthetic),
            other => Err(format!("unknown rating policy '{}' (expected none or synthetic)", other)),
        }
    }
}

impl fmt::Display for RatingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingPolicy::None => write!(f, "none"),
            RatingPolicy::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// Deterministic placeholder in [3.2, 5.0], one decimal place
pub fn synthetic_rating(name: &str) -> f64 {
    let sum: u64 = name.chars().map(|c| u64::from(u32::from(c))).sum();
    let spread = (sum % u64::from(SYNTHETIC_SPREAD)) as f64 / 100.0;
    let value = ((spread + SYNTHETIC_BASE) * 10.0).round() / 10.0;
    value.min(MAX_RATING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RatingSource;

    #[test]
    fn test_synthetic_rating_known_value() {
        // (65 + 66 + 67) % 180 = 18 -> 3.38 -> 3.4
        assert_eq!(synthetic_rating("ABC"), 3.4);
        assert_eq!(synthetic_rating(""), 3.2);
    }

    #[test]
    fn test_synthetic_rating_range_and_precision() {
        let names = ["光明牙醫診所", "仁愛診所", "Smile", "z", "一二三四五六七八九十", "ÿÿÿ"];
        for name in names {
            let value = synthetic_rating(name);
            assert!((3.2..=5.0).contains(&value), "{} -> {}", name, value);
            assert!(((value * 10.0).round() - value * 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_top_of_range_clamps_to_five() {
        // 179 -> 1.79 + 3.2 = 4.99 -> rounds to 5.0
        let name = char::from_u32(179).unwrap().to_string();
        assert_eq!(synthetic_rating(&name), 5.0);
    }

    #[test]
    fn test_policy_tags_provenance() {
        assert_eq!(RatingPolicy::None.offline_rating("ABC"), None);
        let rating = RatingPolicy::Synthetic.offline_rating("ABC").unwrap();
        assert_eq!(rating.source, RatingSource::Synthetic);
        assert_eq!(rating.value, 3.4);
        assert!("bogus".parse::<RatingPolicy>().is_err());
    }
}
