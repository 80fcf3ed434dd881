// Pipeline processing: normalization, enrichment and catalog queries

pub mod catalog;
pub mod enrich;
pub mod normalize;
