//! In-memory view over a normalized record set: lookup, search and grouping.

use std::collections::BTreeMap;

use crate::error::{DirectoryError, Result};
use crate::types::{ClinicRecord, CommunityGroup};

#[derive(Debug, Clone, Default)]
pub struct ClinicCatalog {
    records: Vec<ClinicRecord>,
}

impl ClinicCatalog {
    pub fn new(records: Vec<ClinicRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ClinicRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ClinicRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for a detail page; unknown slugs are `NotFound`
    pub fn find_by_slug(&self, slug: &str) -> Result<&ClinicRecord> {
        self.records
            .iter()
            .find(|r| r.slug == slug)
            .ok_or_else(|| DirectoryError::NotFound { slug: slug.to_string() })
    }

    /// Case-folded substring match against name, community and address.
    /// A blank query matches every record.
    pub fn search(&self, query: &str) -> Vec<&ClinicRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.records.iter().collect();
        }
        self.records
            .iter()
            .filter(|r| {
                [&r.name, &r.community, &r.address]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn in_community(&self, community: &str) -> Vec<&ClinicRecord> {
        self.records.iter().filter(|r| r.community == community).collect()
    }

    /// Distinct community labels in display order
    pub fn communities(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.records.iter().map(|r| r.community.as_str()).collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    pub fn groups(&self) -> Vec<CommunityGroup> {
        group_by_community(self.records.iter())
    }
}

/// Group records by community. Groups are ordered by label and clinics by name,
/// with the slug as a tiebreaker so the order is stable across runs.
pub fn group_by_community<'a, I>(records: I) -> Vec<CommunityGroup>
where
    I: IntoIterator<Item = &'a ClinicRecord>,
{
    let mut grouped: BTreeMap<String, Vec<ClinicRecord>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.community.clone())
            .or_default()
            .push(record.clone());
    }

    grouped
        .into_iter()
        .map(|(community, mut clinics)| {
            clinics.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.slug.cmp(&b.slug)));
            CommunityGroup { community, clinics }
        })
        .collect()
}
