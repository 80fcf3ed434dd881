use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_OUTPUT_DIR, DEFAULT_SITE_TITLE, DEFAULT_SOURCE_FILE,
    GOOGLE_MAPS_API_KEY_ENV, UNCATEGORIZED_COMMUNITY,
};
use crate::error::{DirectoryError, Result};
use crate::pipeline::processing::enrich::{EnrichmentSettings, DEFAULT_LOOKUP_TIMEOUT};
use crate::pipeline::processing::normalize::community::{default_districts, default_rules};
use crate::pipeline::processing::normalize::{
    ColumnMap, CommunityResolver, CommunityRule, NormalizationPolicy, RatingPolicy, SlugStrategy,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub site: SiteConfig,
    pub community: CommunityConfig,
    pub slug: SlugConfig,
    pub rating: RatingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// CSV file path or http(s) URL
    pub path: String,
    pub columns: ColumnMap,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { path: DEFAULT_SOURCE_FILE.to_string(), columns: ColumnMap::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub output_dir: PathBuf,
    pub title: String,
    /// Shown in the page footer; the source location when unset
    pub data_source_label: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            title: DEFAULT_SITE_TITLE.to_string(),
            data_source_label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityConfig {
    pub rules: Vec<CommunityRule>,
    pub sentinel: String,
    /// District code to district name
    pub districts: HashMap<String, String>,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            sentinel: UNCATEGORIZED_COMMUNITY.to_string(),
            districts: default_districts(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlugConfig {
    pub strategy: SlugStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub policy: RatingPolicy,
    pub ratings_file: Option<PathBuf>,
    /// Query the live Places service when an API key is available
    pub live: bool,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_in_flight: Option<usize>,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            policy: RatingPolicy::default(),
            ratings_file: None,
            live: false,
            api_key: None,
            timeout_secs: DEFAULT_LOOKUP_TIMEOUT.as_secs(),
            max_in_flight: None,
        }
    }
}

impl Config {
    /// Load configuration. Without an explicit path, a missing default file means
    /// built-in defaults; an explicit path that cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => {
                info!("Loaded configuration from {}", config_path.display());
                Self::from_toml_str(&content)?
            }
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No {} found, using defaults", config_path.display());
                Self::default()
            }
            Err(e) => {
                return Err(DirectoryError::Config(format!(
                    "Failed to read config file '{}': {}",
                    config_path.display(),
                    e
                )))
            }
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Pick up the Places API key from the environment
    pub fn apply_env(&mut self) {
        self.apply_api_key(std::env::var(GOOGLE_MAPS_API_KEY_ENV).ok());
    }

    fn apply_api_key(&mut self, key: Option<String>) {
        if let Some(key) = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            self.rating.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.columns.name.trim().is_empty() {
            return Err(DirectoryError::Config("source.columns.name must not be empty".to_string()));
        }
        if self.rating.timeout_secs == 0 {
            return Err(DirectoryError::Config("rating.timeout_secs must be at least 1".to_string()));
        }
        if self.rating.max_in_flight == Some(0) {
            return Err(DirectoryError::Config("rating.max_in_flight must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn normalization_policy(&self) -> NormalizationPolicy {
        NormalizationPolicy {
            columns: self.source.columns.clone(),
            community: CommunityResolver::new(
                self.community.rules.clone(),
                self.community.districts.clone(),
                &self.community.sentinel,
            ),
            slug_strategy: self.slug.strategy,
            rating_policy: self.rating.policy,
        }
    }

    pub fn enrichment_settings(&self) -> EnrichmentSettings {
        EnrichmentSettings {
            timeout: Duration::from_secs(self.rating.timeout_secs.max(1)),
            max_in_flight: self.rating.max_in_flight,
        }
    }

    /// The live lookup runs only when requested and a key is present
    pub fn live_api_key(&self) -> Option<&str> {
        if !self.rating.live {
            return None;
        }
        self.rating.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn data_source_label(&self) -> &str {
        self.site.data_source_label.as_deref().unwrap_or(&self.source.path)
    }
}
