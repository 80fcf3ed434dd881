use tracing::{info, instrument};

use crate::app::ports::SourcePort;
use crate::error::Result;
use crate::parser::DelimitedParser;
use crate::pipeline::processing::catalog::ClinicCatalog;
use crate::pipeline::processing::normalize::{ClinicNormalizer, NormalizationPolicy};

/// Use case for turning the source text into a normalized catalog
pub struct LoadCatalogUseCase {
    source: Box<dyn SourcePort>,
    parser: DelimitedParser,
    normalizer: ClinicNormalizer,
}

impl LoadCatalogUseCase {
    pub fn new(source: Box<dyn SourcePort>, policy: NormalizationPolicy) -> Self {
        Self {
            source,
            parser: DelimitedParser::new(policy.columns.name.clone()),
            normalizer: ClinicNormalizer::new(policy),
        }
    }

    /// Only an unreadable source fails; every parsed row yields a record
    #[instrument(skip(self), fields(source = %self.source.location()))]
    pub async fn load(&self) -> Result<ClinicCatalog> {
        let text = self.source.read_text().await?;
        let table = self.parser.parse(&text);
        let records = self.normalizer.normalize_table(&table);
        info!(
            "Loaded {} clinics from {} ({} rows dropped)",
            records.len(),
            self.source.location(),
            table.dropped_rows
        );
        Ok(ClinicCatalog::new(records))
    }
}

/// Serialize a catalog the way `data/clinics.json` is written
pub fn export_json(catalog: &ClinicCatalog) -> Result<String> {
    Ok(serde_json::to_string_pretty(catalog.records())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DirectoryError;
    use async_trait::async_trait;

    struct StaticSource(&'static str);

    #[async_trait]
    impl SourcePort for StaticSource {
        async fn read_text(&self) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn location(&self) -> &str {
            "static"
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl SourcePort for BrokenSource {
        async fn read_text(&self) -> Result<String> {
            Err(DirectoryError::Load { location: "broken".to_string(), reason: "unreachable".to_string() })
        }

        fn location(&self) -> &str {
            "broken"
        }
    }

    const CSV: &str = "\u{feff}機構名稱,縣市別代碼,行政區域代碼,街道項弄號,負責人,電話\r\n\
        \"光明牙醫診所\",10018,10018010,東區光明里1號,王小明,03-1234567\r\n\
        ,10018,10018020,北區,,\r\n\
        仁愛診所,10018,10018020,北區仁愛里2號,李大華,03-7654321\r\n";

    #[tokio::test]
    async fn test_load_parses_and_normalizes() {
        let use_case = LoadCatalogUseCase::new(Box::new(StaticSource(CSV)), NormalizationPolicy::default());
        let catalog = use_case.load().await.unwrap();

        assert_eq!(catalog.len(), 2);
        let first = &catalog.records()[0];
        assert_eq!(first.name, "光明牙醫診所");
        assert_eq!(first.community, "光明里");
        assert_eq!(catalog.search("仁愛").len(), 1);
    }

    #[tokio::test]
    async fn test_load_failure_propagates() {
        let use_case = LoadCatalogUseCase::new(Box::new(BrokenSource), NormalizationPolicy::default());
        let err = use_case.load().await.unwrap_err();
        assert!(err.is_load_failure());
    }

    #[tokio::test]
    async fn test_export_json_uses_camel_case() {
        let use_case = LoadCatalogUseCase::new(Box::new(StaticSource(CSV)), NormalizationPolicy::default());
        let catalog = use_case.load().await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&export_json(&catalog).unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["cityCode"], "10018");
        assert!(json[0]["rating"].is_null());
    }
}
