//! Curated `ratings.json` keyed by slug.
//!
//! The generator writes a template with an entry per clinic; maintainers fill in
//! ratings by hand and the same file is then read back as a rating source.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::app::ports::{RatingLookupPort, RatingQuery};
use crate::constants::RATING_PENDING_NOTE;
use crate::error::{DirectoryError, Result};
use crate::types::{ClinicRecord, RatingLookup};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEntry {
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RatingEntry {
    pub fn pending() -> Self {
        Self { rating: None, review_count: None, note: Some(RATING_PENDING_NOTE.to_string()) }
    }
}

pub type RatingsTable = BTreeMap<String, RatingEntry>;

pub struct RatingsFileLookup {
    entries: RatingsTable,
    path: PathBuf,
}

impl RatingsFileLookup {
    pub fn from_entries(entries: RatingsTable) -> Self {
        Self { entries, path: PathBuf::new() }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            DirectoryError::Config(format!("cannot read ratings file '{}': {}", path.display(), e))
        })?;
        let entries: RatingsTable = serde_json::from_str(&text)?;
        let rated = entries.values().filter(|e| e.rating.is_some()).count();
        info!("Loaded {} rating entries ({} rated) from {}", entries.len(), rated, path.display());
        Ok(Self { entries, path: path.to_path_buf() })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RatingLookupPort for RatingsFileLookup {
    async fn lookup(&self, query: &RatingQuery) -> std::result::Result<Option<RatingLookup>, String> {
        Ok(self.entries.get(&query.slug).and_then(|entry| {
            entry.rating.map(|rating| RatingLookup { rating, review_count: entry.review_count })
        }))
    }

    fn source_name(&self) -> &str {
        "ratings-file"
    }
}

/// Build the ratings template for `records`, keeping every entry already present in
/// `existing` (including entries for clinics that are no longer listed).
pub fn merge_template(existing: Option<&str>, records: &[ClinicRecord]) -> Result<RatingsTable> {
    let mut table: RatingsTable = match existing {
        Some(text) if !text.trim().is_empty() => serde_json::from_str(text)?,
        _ => RatingsTable::new(),
    };

    let mut added = 0;
    for record in records {
        table.entry(record.slug.clone()).or_insert_with(|| {
            added += 1;
            RatingEntry::pending()
        });
    }
    if added > 0 {
        info!("Added {} new entries to the ratings template", added);
    }
    let stale = table.len().saturating_sub(records.len());
    if stale > 0 {
        warn!("Ratings template keeps {} entries with no matching clinic", stale);
    }
    Ok(table)
}
