//! Turns parsed rows into canonical clinic records.
//!
//! Derivation is total: every row produces a record, and missing inputs fall back to
//! placeholder values instead of errors.

pub mod community;
pub mod rating;
pub mod slug;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::constants::{
    COLUMN_ADDRESS, COLUMN_CITY_CODE, COLUMN_DISTRICT_CODE, COLUMN_NAME, COLUMN_PHONE,
    COLUMN_PRINCIPAL, MAPS_SEARCH_URL, UNKNOWN_CLINIC_NAME,
};
use crate::metrics::NormalizeMetrics;
use crate::parser::{ParsedRow, ParsedTable};
use crate::types::ClinicRecord;

pub use community::{CommunityResolver, CommunityRule};
pub use rating::{synthetic_rating, RatingPolicy};
pub use slug::{SlugRegistry, SlugStrategy};

/// Header labels for each source column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub name: String,
    pub city_code: String,
    pub district_code: String,
    pub address: String,
    pub principal: String,
    pub phone: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            name: COLUMN_NAME.to_string(),
            city_code: COLUMN_CITY_CODE.to_string(),
            district_code: COLUMN_DISTRICT_CODE.to_string(),
            address: COLUMN_ADDRESS.to_string(),
            principal: COLUMN_PRINCIPAL.to_string(),
            phone: COLUMN_PHONE.to_string(),
        }
    }
}

/// The derivation choices applied to a whole dataset
#[derive(Debug, Clone, Default)]
pub struct NormalizationPolicy {
    pub columns: ColumnMap,
    pub community: CommunityResolver,
    pub slug_strategy: SlugStrategy,
    pub rating_policy: RatingPolicy,
}

pub struct ClinicNormalizer {
    policy: NormalizationPolicy,
}

impl Default for ClinicNormalizer {
    fn default() -> Self {
        Self::new(NormalizationPolicy::default())
    }
}

impl ClinicNormalizer {
    pub fn new(policy: NormalizationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &NormalizationPolicy {
        &self.policy
    }

    /// Normalize every row of a table. Slugs are unique across the returned records.
    #[instrument(skip(self, table), fields(rows = table.rows.len(), slug_strategy = %self.policy.slug_strategy))]
    pub fn normalize_table(&self, table: &ParsedTable) -> Vec<ClinicRecord> {
        let mut slugs = SlugRegistry::new();
        let records: Vec<ClinicRecord> = table
            .rows
            .iter()
            .map(|row| self.normalize_row(row, &mut slugs))
            .collect();

        let uncategorized = records
            .iter()
            .filter(|r| r.community == self.policy.community.sentinel())
            .count();
        NormalizeMetrics::record_batch(records.len(), uncategorized);
        info!(
            "Normalized {} clinics ({} without a community)",
            records.len(),
            uncategorized
        );
        records
    }

    /// Normalize a single row, claiming its slug from `slugs`
    pub fn normalize_row(&self, row: &ParsedRow, slugs: &mut SlugRegistry) -> ClinicRecord {
        let columns = &self.policy.columns;

        let name = match row.get(&columns.name).trim() {
            "" => UNKNOWN_CLINIC_NAME.to_string(),
            n => n.to_string(),
        };
        let city_code = row.get(&columns.city_code).trim().to_string();
        let district_code = row.get(&columns.district_code).trim().to_string();
        let address = row.get(&columns.address).trim().to_string();
        let principal = row.get(&columns.principal).trim().to_string();
        let phone = row.get(&columns.phone).trim().to_string();

        let community = self.policy.community.resolve(&address, &district_code);
        let derived = self.policy.slug_strategy.derive(&name, &address);
        let slug = slugs.claim(derived.clone());
        if slug != derived {
            debug!(line = row.line, "Slug '{}' already taken, using '{}'", derived, slug);
            NormalizeMetrics::slug_disambiguated();
        }

        ClinicRecord {
            map_url: map_search_url(&name, &address),
            rating: self.policy.rating_policy.offline_rating(&name),
            name,
            city_code,
            district_code,
            address,
            principal,
            phone,
            community,
            slug,
        }
    }
}

/// Google Maps search link for a clinic
pub fn map_search_url(name: &str, address: &str) -> String {
    let query = format!("{} {}", name, address);
    Url::parse_with_params(MAPS_SEARCH_URL, &[("api", "1"), ("query", query.trim())])
        .map(|url| url.to_string())
        .unwrap_or_else(|_| MAPS_SEARCH_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::UNCATEGORIZED_COMMUNITY;
    use crate::parser::{parse_table, DelimitedParser};
    use crate::types::RatingSource;

    const CSV: &str = "機構名稱,縣市別代碼,行政區域代碼,街道項弄號,負責人,電話\n\
        光明牙醫診所,10018,10018010,東區光明里1號,王小明,03-1234567\n\
        仁愛牙醫診所,10018,10018020,北區仁愛里2號,李大華,03-7654321\n\
        仁愛牙醫診所,10018,10018020,北區仁愛里2號,李大華,03-7654321\n\
        香山牙醫診所,10018,10018030,中華路五段100號,陳美麗,03-5381234\n\
        無名牙醫,10018,,,,\n";

    #[test]
    fn test_sample_row_derives_community_and_passthrough() {
        let table = parse_table(CSV);
        let records = ClinicNormalizer::default().normalize_table(&table);
        let first = &records[0];
        assert_eq!(first.name, "光明牙醫診所");
        assert_eq!(first.community, "光明里");
        assert_eq!(first.phone, "03-1234567");
        assert_eq!(first.district_code, "10018010");
        assert_eq!(first.principal, "王小明");
        assert!(first.rating.is_none());
    }

    #[test]
    fn test_every_record_has_community_and_unique_slug() {
        let table = parse_table(CSV);
        let records = ClinicNormalizer::default().normalize_table(&table);
        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| !r.community.is_empty()));
        assert_eq!(records[3].community, "香山區");
        assert_eq!(records[4].community, UNCATEGORIZED_COMMUNITY);

        let mut slugs: Vec<&str> = records.iter().map(|r| r.slug.as_str()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), records.len());
        assert_eq!(records[2].slug, format!("{}-2", records[1].slug));
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let table = parse_table(CSV);
        let normalizer = ClinicNormalizer::default();
        assert_eq!(normalizer.normalize_table(&table), normalizer.normalize_table(&table));
    }

    #[test]
    fn test_slugify_policy_and_synthetic_ratings() {
        let policy = NormalizationPolicy {
            slug_strategy: SlugStrategy::Slugify,
            rating_policy: RatingPolicy::Synthetic,
            ..Default::default()
        };
        let table = DelimitedParser::new(COLUMN_NAME).parse(CSV);
        let records = ClinicNormalizer::new(policy).normalize_table(&table);
        assert_eq!(records[0].slug, "光明牙醫診所");
        assert_eq!(records[2].slug, "仁愛牙醫診所-2");
        let rating = records[0].rating.as_ref().unwrap();
        assert_eq!(rating.source, RatingSource::Synthetic);
        assert_eq!(rating.value, synthetic_rating("光明牙醫診所"));
    }

    #[test]
    fn test_custom_columns() {
        let policy = NormalizationPolicy {
            columns: ColumnMap {
                name: "name".to_string(),
                address: "street".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let table = parse_table("name,street\nABC Dental,東區光明里3號\n");
        let records = ClinicNormalizer::new(policy).normalize_table(&table);
        assert_eq!(records[0].name, "ABC Dental");
        assert_eq!(records[0].community, "光明里");
        assert_eq!(records[0].phone, "");
    }

    #[test]
    fn test_missing_name_gets_placeholder() {
        let table = parse_table("機構名稱,電話\n,123\n");
        let records = ClinicNormalizer::default().normalize_table(&table);
        assert_eq!(records[0].name, UNKNOWN_CLINIC_NAME);
    }

    #[test]
    fn test_map_search_url_encodes_query() {
        let url = map_search_url("光明牙醫診所", "東區光明里1號");
        assert!(url.starts_with("https://www.google.com/maps/search/?api=1&query="));
        assert!(!url.contains(' '));
        assert!(url.contains("%E5%85%89"));
    }
}
