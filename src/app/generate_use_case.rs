use tracing::{info, instrument};

use crate::app::ports::SiteOutputPort;
use crate::constants::RATINGS_FILE;
use crate::error::Result;
use crate::infra::ratings_file::merge_template;
use crate::metrics::site::GENERATE_DURATION;
use crate::metrics::{time_operation, SiteMetrics};
use crate::pipeline::processing::catalog::ClinicCatalog;
use crate::pipeline::processing::enrich::{EnrichmentReport, RatingEnricher};
use crate::site::SiteBuilder;

/// Summary of one generator run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub clinics: usize,
    pub communities: usize,
    pub files_written: usize,
    pub enrichment: Option<EnrichmentReport>,
}

/// Use case for writing the static site for a catalog
pub struct GenerateSiteUseCase {
    builder: SiteBuilder,
    output: Box<dyn SiteOutputPort>,
    enricher: Option<RatingEnricher>,
}

impl GenerateSiteUseCase {
    pub fn new(builder: SiteBuilder, output: Box<dyn SiteOutputPort>) -> Self {
        Self { builder, output, enricher: None }
    }

    pub fn with_enricher(mut self, enricher: RatingEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Enrich ratings (when a lookup is configured), render and write every file.
    /// Returns the catalog that was rendered.
    #[instrument(skip_all, fields(clinics = catalog.len()))]
    pub async fn execute(&self, catalog: ClinicCatalog) -> Result<(ClinicCatalog, GenerateReport)> {
        let _timer = time_operation(GENERATE_DURATION);

        let (catalog, enrichment) = match &self.enricher {
            Some(enricher) => {
                let (records, report) = enricher.enrich(catalog.into_records()).await;
                (ClinicCatalog::new(records), Some(report))
            }
            None => (catalog, None),
        };

        let files = self.builder.build(&catalog)?;
        for file in &files {
            self.output.write_file(&file.path, &file.contents).await?;
            SiteMetrics::page_written(file.contents.len());
        }

        let existing = self.output.read_file(RATINGS_FILE).await?;
        let existing = existing.map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
        let template = merge_template(existing.as_deref(), catalog.records())?;
        let ratings = serde_json::to_vec_pretty(&template)?;
        self.output.write_file(RATINGS_FILE, &ratings).await?;
        SiteMetrics::page_written(ratings.len());

        let report = GenerateReport {
            clinics: catalog.len(),
            communities: catalog.communities().len(),
            files_written: files.len() + 1,
            enrichment,
        };
        info!(
            "Generated {} clinic pages in {} communities ({} files)",
            report.clinics, report.communities, report.files_written
        );
        Ok((catalog, report))
    }
}
