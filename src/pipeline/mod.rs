// Clinic data pipeline: normalization, rating enrichment and the catalog view

pub mod processing;
