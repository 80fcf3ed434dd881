use crate::app::ports::SourcePort;
use crate::error::{DirectoryError, Result};
use crate::metrics::ParseMetrics;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};

/// Source text served over HTTP(S)
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: &str) -> Self {
        Self { client: reqwest::Client::new(), url: url.to_string() }
    }

    fn load_error(&self, reason: impl ToString) -> DirectoryError {
        DirectoryError::Load { location: self.url.clone(), reason: reason.to_string() }
    }
}

#[async_trait]
impl SourcePort for HttpSource {
    async fn read_text(&self) -> Result<String> {
        info!("Fetching clinic data from {}", self.url);
        let resp = self.client.get(&self.url).send().await.map_err(|e| self.load_error(e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(self.load_error(format!("HTTP status {}", status)));
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = resp.bytes().await.map_err(|e| self.load_error(e))?;
        debug!(content_type = %content_type, bytes = bytes.len(), "Fetched source");
        ParseMetrics::record_source_bytes(bytes.len());

        String::from_utf8(bytes.to_vec()).map_err(|_| self.load_error("response is not valid UTF-8"))
    }

    fn location(&self) -> &str {
        &self.url
    }
}
