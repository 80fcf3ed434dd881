use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use tempfile::tempdir;

use clinic_directory::app::generate_use_case::GenerateSiteUseCase;
use clinic_directory::app::load_use_case::LoadCatalogUseCase;
use clinic_directory::app::ports::{RatingLookupPort, RatingQuery};
use clinic_directory::config::Config;
use clinic_directory::infra::{FileSource, FsSiteOutput, RatingsFileLookup};
use clinic_directory::pipeline::processing::enrich::{ChainedRatingLookup, EnrichmentSettings, RatingEnricher};
use clinic_directory::pipeline::processing::normalize::SlugStrategy;
use clinic_directory::site::{page_href, SiteBuilder, SiteSettings};
use clinic_directory::types::{RatingLookup, RatingSource};
use clinic_directory::DirectoryError;

const CSV: &str = "\u{feff}機構名稱,縣市別代碼,行政區域代碼,街道項弄號,負責人,電話\n\
光明牙醫診所,10018,10018010,東區光明里1號,王小明,03-1234567\n\
仁愛診所,10018,10018020,北區仁愛里2號,李大華,03-7654321\n\
\"香山牙醫, 分院\",10018,10018030,中華路五段100號,陳美麗,03-5381234\n\
新開牙醫,10018,,,,\n\
\"未結束引號,10018,10018010,東區,林,03\n";

fn write_csv(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("clinics.csv");
    fs::write(&path, CSV).unwrap();
    path
}

fn builder() -> SiteBuilder {
    SiteBuilder::new(
        SiteSettings { title: "新竹市牙醫診所地圖".to_string(), data_source: "clinics.csv".to_string() },
        Local::now(),
    )
}

#[tokio::test]
async fn test_generate_writes_complete_tree() -> Result<()> {
    let temp_dir = tempdir()?;
    let csv = write_csv(temp_dir.path());
    let out = temp_dir.path().join("docs");

    let config = Config::default();
    let catalog = LoadCatalogUseCase::new(Box::new(FileSource::new(&csv)), config.normalization_policy())
        .load()
        .await?;
    assert_eq!(catalog.len(), 5);

    let use_case = GenerateSiteUseCase::new(builder(), Box::new(FsSiteOutput::new(&out)));
    let (catalog, report) = use_case.execute(catalog).await?;
    assert_eq!(report.clinics, 5);

    assert!(out.join("index.html").is_file());
    assert!(out.join("assets/style.css").is_file());
    assert!(out.join("assets/search.js").is_file());
    assert!(out.join("data/clinics.json").is_file());
    assert!(out.join("ratings.json").is_file());

    let pages: Vec<_> = fs::read_dir(out.join("clinics"))?.collect();
    assert_eq!(pages.len(), 5);

    let index = fs::read_to_string(out.join("index.html"))?;
    for record in catalog.records() {
        assert!(out.join("clinics").join(format!("{}.html", record.slug)).is_file());
        assert!(index.contains(&page_href(&record.slug)));
    }
    assert!(index.contains("光明里"));
    assert!(index.contains("香山區"));
    assert!(index.contains("未分類"));
    assert!(index.contains("香山牙醫, 分院"));

    let ratings: BTreeMap<String, serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(out.join("ratings.json"))?)?;
    assert_eq!(ratings.len(), 5);
    assert!(ratings.values().all(|entry| entry["rating"].is_null()));
    Ok(())
}

#[tokio::test]
async fn test_regeneration_is_stable() -> Result<()> {
    let temp_dir = tempdir()?;
    let csv = write_csv(temp_dir.path());
    let mut config = Config::default();
    config.slug.strategy = SlugStrategy::Slugify;

    let load = || LoadCatalogUseCase::new(Box::new(FileSource::new(&csv)), config.normalization_policy());
    let first = load().load().await?;
    let second = load().load().await?;
    assert_eq!(first.records(), second.records());
    assert_eq!(first.find_by_slug("光明牙醫診所")?.community, "光明里");
    Ok(())
}

#[tokio::test]
async fn test_ratings_file_feeds_pages() -> Result<()> {
    let temp_dir = tempdir()?;
    let csv = write_csv(temp_dir.path());
    let out = temp_dir.path().join("docs");

    let mut config = Config::default();
    config.slug.strategy = SlugStrategy::Slugify;
    let catalog = LoadCatalogUseCase::new(Box::new(FileSource::new(&csv)), config.normalization_policy())
        .load()
        .await?;

    let ratings_path = temp_dir.path().join("ratings.json");
    fs::write(&ratings_path, r#"{"仁愛診所": {"rating": 4.6, "reviewCount": 51}}"#)?;
    let file_lookup: Arc<dyn RatingLookupPort> = Arc::new(RatingsFileLookup::load(&ratings_path).await?);
    let offline: Arc<dyn RatingLookupPort> = Arc::new(AlwaysFails);
    let chain = ChainedRatingLookup::new(vec![file_lookup, offline]);
    let enricher = RatingEnricher::new(Arc::new(chain), EnrichmentSettings::default());

    let use_case = GenerateSiteUseCase::new(builder(), Box::new(FsSiteOutput::new(&out))).with_enricher(enricher);
    let (catalog, report) = use_case.execute(catalog).await?;

    let enrichment = report.enrichment.expect("enrichment ran");
    assert_eq!(enrichment.found, 1);
    assert_eq!(enrichment.failed, 4);

    let renai = catalog.find_by_slug("仁愛診所")?;
    let rating = renai.rating.as_ref().expect("rating applied");
    assert_eq!(rating.source, RatingSource::Fetched);
    assert_eq!(rating.review_count, Some(51));

    let page = fs::read_to_string(out.join("clinics").join("仁愛診所.html"))?;
    assert!(page.contains(r#"<span class="rating-value">4.6</span>"#));
    assert!(page.contains("（51 則評論）"));

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(out.join("ratings.json"))?)?;
    assert!(saved["仁愛診所"]["rating"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_missing_source_is_a_load_failure() -> Result<()> {
    let temp_dir = tempdir()?;
    let missing = temp_dir.path().join("nope.csv");
    let result = LoadCatalogUseCase::new(Box::new(FileSource::new(&missing)), Config::default().normalization_policy())
        .load()
        .await;
    assert!(matches!(result, Err(DirectoryError::Load { .. })));
    Ok(())
}

struct AlwaysFails;

#[async_trait]
impl RatingLookupPort for AlwaysFails {
    async fn lookup(&self, _query: &RatingQuery) -> std::result::Result<Option<RatingLookup>, String> {
        Err("offline".to_string())
    }

    fn source_name(&self) -> &str {
        "offline"
    }
}
