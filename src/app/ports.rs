use async_trait::async_trait;

use crate::error::Result;
use crate::types::RatingLookup;

/// What a rating source needs to know about one clinic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingQuery {
    pub name: String,
    pub address: String,
    pub slug: String,
}

/// An external rating source. Lookups may fail or return nothing; callers
/// never let that block anything else.
#[async_trait]
pub trait RatingLookupPort: Send + Sync {
    async fn lookup(&self, query: &RatingQuery) -> std::result::Result<Option<RatingLookup>, String>;

    /// Short label for logs
    fn source_name(&self) -> &str;
}

/// Where the raw delimited text comes from
#[async_trait]
pub trait SourcePort: Send + Sync {
    /// Read the whole source text. Failures are `DirectoryError::Load`.
    async fn read_text(&self) -> Result<String>;

    fn location(&self) -> &str;
}

/// Destination of the generated site
#[async_trait]
pub trait SiteOutputPort: Send + Sync {
    /// Write `contents` at `relative_path`, creating parent directories
    async fn write_file(&self, relative_path: &str, contents: &[u8]) -> Result<()>;

    /// Read a previously generated file, `None` when it does not exist
    async fn read_file(&self, relative_path: &str) -> Result<Option<Vec<u8>>>;
}
