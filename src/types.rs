use serde::{Deserialize, Serialize};

/// One clinic after normalization: raw passthrough columns plus derived fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicRecord {
    pub name: String,
    pub city_code: String,
    pub district_code: String,
    pub address: String,
    pub principal: String,
    pub phone: String,
    /// Neighbourhood label derived from the address, never empty
    pub community: String,
    /// Stable, dataset-unique routing identifier
    pub slug: String,
    pub map_url: String,
    pub rating: Option<Rating>,
}

impl ClinicRecord {
    /// Phone number reduced to the characters a `tel:` link accepts
    pub fn tel_target(&self) -> String {
        self.phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect()
    }

    /// Return the same record carrying `rating` instead of its current one
    pub fn with_rating(self, rating: Option<Rating>) -> Self {
        Self { rating, ..self }
    }
}

/// Where a rating value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingSource {
    /// Computed from the clinic name as a display placeholder
    Synthetic,
    /// Returned by a rating lookup (live service or curated ratings file)
    Fetched,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub value: f64,
    pub review_count: Option<u32>,
    pub source: RatingSource,
}

impl Rating {
    pub fn fetched(value: f64, review_count: Option<u32>) -> Self {
        Self { value, review_count, source: RatingSource::Fetched }
    }

    pub fn synthetic(value: f64) -> Self {
        Self { value, review_count: None, source: RatingSource::Synthetic }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == RatingSource::Synthetic
    }
}

/// Result of an external rating lookup for one clinic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingLookup {
    pub rating: f64,
    pub review_count: Option<u32>,
}

/// A community label with the clinics filed under it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityGroup {
    pub community: String,
    pub clinics: Vec<ClinicRecord>,
}

impl CommunityGroup {
    pub fn len(&self) -> usize {
        self.clinics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clinics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clinic(phone: &str) -> ClinicRecord {
        ClinicRecord {
            name: "光明牙醫診所".to_string(),
            city_code: "10018".to_string(),
            district_code: "10018010".to_string(),
            address: "東區光明里1號".to_string(),
            principal: "王小明".to_string(),
            phone: phone.to_string(),
            community: "光明里".to_string(),
            slug: "光明牙醫診所".to_string(),
            map_url: String::new(),
            rating: None,
        }
    }

    #[test]
    fn test_tel_target_strips_formatting() {
        assert_eq!(clinic("03-1234567").tel_target(), "031234567");
        assert_eq!(clinic("+886 (3) 123 4567").tel_target(), "+88631234567");
        assert_eq!(clinic("").tel_target(), "");
    }

    #[test]
    fn test_rating_serializes_with_provenance() {
        let json = serde_json::to_value(Rating::synthetic(3.4)).unwrap();
        assert_eq!(json["source"], "synthetic");
        assert_eq!(json["value"], 3.4);

        let json = serde_json::to_value(Rating::fetched(4.6, Some(120))).unwrap();
        assert_eq!(json["source"], "fetched");
        assert_eq!(json["reviewCount"], 120);
    }

    #[test]
    fn test_with_rating_replaces_only_rating() {
        let original = clinic("03-1234567");
        let rated = original.clone().with_rating(Some(Rating::fetched(4.2, None)));
        assert_eq!(rated.name, original.name);
        assert_eq!(rated.rating.as_ref().map(|r| r.value), Some(4.2));
    }
}
