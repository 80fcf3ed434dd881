use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::app::ports::SourcePort;
use crate::error::{DirectoryError, Result};
use crate::infra::http_client::HttpSource;
use crate::metrics::ParseMetrics;

/// Source text read from the local filesystem
pub struct FileSource {
    path: PathBuf,
    location: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let location = path.display().to_string();
        Self { path, location }
    }
}

#[async_trait]
impl SourcePort for FileSource {
    async fn read_text(&self) -> Result<String> {
        info!("Reading clinic data from {}", self.location);
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| DirectoryError::Load {
            location: self.location.clone(),
            reason: e.to_string(),
        })?;
        ParseMetrics::record_source_bytes(bytes.len());

        String::from_utf8(bytes).map_err(|_| DirectoryError::Load {
            location: self.location.clone(),
            reason: "file is not valid UTF-8".to_string(),
        })
    }

    fn location(&self) -> &str {
        &self.location
    }
}

/// Pick the adapter for a source location: URLs are fetched, anything else is a path
pub fn source_for(location: &str) -> Box<dyn SourcePort> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(location))
    } else {
        Box::new(FileSource::new(location))
    }
}
