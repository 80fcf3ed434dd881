//! Attaches looked-up ratings to normalized records.
//!
//! Every clinic gets its own lookup task. Results are applied by index, so the order in
//! which lookups settle does not matter, and a failed or slow lookup only leaves that
//! clinic with its offline rating.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::app::ports::{RatingLookupPort, RatingQuery};
use crate::metrics::EnrichMetrics;
use crate::types::{ClinicRecord, Rating, RatingLookup};

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentSettings {
    pub timeout: Duration,
    /// Upper bound on lookups in flight at once, `None` for no cap
    pub max_in_flight: Option<usize>,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self { timeout: DEFAULT_LOOKUP_TIMEOUT, max_in_flight: None }
    }
}

/// How each clinic's lookup settled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub found: usize,
    pub empty: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl EnrichmentReport {
    pub fn attempted(&self) -> usize {
        self.found + self.empty + self.failed + self.timed_out
    }
}

#[derive(Debug)]
enum LookupOutcome {
    Found(RatingLookup),
    Empty,
    Failed(String),
    TimedOut,
}

pub struct RatingEnricher {
    lookup: Arc<dyn RatingLookupPort>,
    settings: EnrichmentSettings,
}

impl RatingEnricher {
    pub fn new(lookup: Arc<dyn RatingLookupPort>, settings: EnrichmentSettings) -> Self {
        Self { lookup, settings }
    }

    /// Look up every record's rating and return the records in their original order
    #[instrument(skip(self, records), fields(source = %self.lookup.source_name(), clinics = records.len()))]
    pub async fn enrich(&self, records: Vec<ClinicRecord>) -> (Vec<ClinicRecord>, EnrichmentReport) {
        let limiter = self.settings.max_in_flight.map(|n| Arc::new(Semaphore::new(n.max(1))));
        let mut tasks = JoinSet::new();

        for (index, record) in records.iter().enumerate() {
            let lookup = Arc::clone(&self.lookup);
            let limiter = limiter.clone();
            let timeout = self.settings.timeout;
            let query = RatingQuery {
                name: record.name.clone(),
                address: record.address.clone(),
                slug: record.slug.clone(),
            };

            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                let started = Instant::now();
                let outcome = match tokio::time::timeout(timeout, lookup.lookup(&query)).await {
                    Ok(Ok(Some(found))) => {
                        EnrichMetrics::lookup_found(started.elapsed().as_secs_f64());
                        LookupOutcome::Found(found)
                    }
                    Ok(Ok(None)) => LookupOutcome::Empty,
                    Ok(Err(reason)) => LookupOutcome::Failed(reason),
                    Err(_) => LookupOutcome::TimedOut,
                };
                (index, query.slug, outcome)
            });
        }

        let mut ratings: Vec<Option<Rating>> = records.iter().map(|r| r.rating.clone()).collect();
        let mut report = EnrichmentReport::default();

        while let Some(joined) = tasks.join_next().await {
            let (index, slug, outcome) = match joined {
                Ok(settled) => settled,
                Err(e) => {
                    warn!("Rating lookup task aborted: {}", e);
                    EnrichMetrics::lookup_failed();
                    report.failed += 1;
                    continue;
                }
            };

            match outcome {
                LookupOutcome::Found(found) => match validated(&found) {
                    Some(rating) => {
                        debug!(slug = %slug, rating = rating.value, "Rating found");
                        ratings[index] = Some(rating);
                        report.found += 1;
                    }
                    None => {
                        warn!(slug = %slug, "Discarding out-of-range rating {}", found.rating);
                        EnrichMetrics::lookup_failed();
                        report.failed += 1;
                    }
                },
                LookupOutcome::Empty => {
                    debug!(slug = %slug, "No rating available");
                    EnrichMetrics::lookup_empty();
                    report.empty += 1;
                }
                LookupOutcome::Failed(reason) => {
                    warn!(slug = %slug, "Rating lookup failed: {}", reason);
                    EnrichMetrics::lookup_failed();
                    report.failed += 1;
                }
                LookupOutcome::TimedOut => {
                    warn!(slug = %slug, "Rating lookup timed out after {:?}", self.settings.timeout);
                    EnrichMetrics::lookup_timed_out();
                    report.timed_out += 1;
                }
            }
        }

        info!(
            "Rating enrichment: {} found, {} empty, {} failed, {} timed out",
            report.found, report.empty, report.failed, report.timed_out
        );

        let enriched = records
            .into_iter()
            .zip(ratings)
            .map(|(record, rating)| record.with_rating(rating))
            .collect();
        (enriched, report)
    }
}

fn validated(found: &RatingLookup) -> Option<Rating> {
    if found.rating.is_finite() && (0.0..=5.0).contains(&found.rating) {
        Some(Rating::fetched(found.rating, found.review_count))
    } else {
        None
    }
}

/// Asks each source in turn and returns the first rating found. A failing source is
/// skipped as long as a later one answers.
pub struct ChainedRatingLookup {
    sources: Vec<Arc<dyn RatingLookupPort>>,
    label: String,
}

impl ChainedRatingLookup {
    pub fn new(sources: Vec<Arc<dyn RatingLookupPort>>) -> Self {
        let label = sources
            .iter()
            .map(|s| s.source_name().to_string())
            .collect::<Vec<_>>()
            .join("+");
        Self { sources, label }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[async_trait]
impl RatingLookupPort for ChainedRatingLookup {
    async fn lookup(&self, query: &RatingQuery) -> Result<Option<RatingLookup>, String> {
        let mut last_error = None;
        for source in &self.sources {
            match source.lookup(query).await {
                Ok(Some(found)) => return Ok(Some(found)),
                Ok(None) => {}
                Err(reason) => {
                    debug!(source = source.source_name(), "Lookup error: {}", reason);
                    last_error = Some(format!("{}: {}", source.source_name(), reason));
                }
            }
        }
        match last_error {
            Some(reason) => Err(reason),
            None => Ok(None),
        }
    }

    fn source_name(&self) -> &str {
        &self.label
    }
}
