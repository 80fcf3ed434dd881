use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::app::ports::SiteOutputPort;
use crate::error::Result;

/// Writes the generated site under a root directory
pub struct FsSiteOutput {
    root: PathBuf,
}

impl FsSiteOutput {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl SiteOutputPort for FsSiteOutput {
    async fn write_file(&self, relative_path: &str, contents: &[u8]) -> Result<()> {
        let path = self.root.join(relative_path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, contents).await?;
        debug!("Wrote {} ({} bytes)", path.display(), contents.len());
        Ok(())
    }

    async fn read_file(&self, relative_path: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.root.join(relative_path)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps generated files in memory, keyed by relative path
#[derive(Clone, Default)]
pub struct MemorySiteOutput {
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemorySiteOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn paths(&self) -> Vec<String> {
        self.files.lock().await.keys().cloned().collect()
    }

    pub async fn text(&self, relative_path: &str) -> Option<String> {
        self.files
            .lock()
            .await
            .get(relative_path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

#[async_trait]
impl SiteOutputPort for MemorySiteOutput {
    async fn write_file(&self, relative_path: &str, contents: &[u8]) -> Result<()> {
        self.files.lock().await.insert(relative_path.to_string(), contents.to_vec());
        Ok(())
    }

    async fn read_file(&self, relative_path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.files.lock().await.get(relative_path).cloned())
    }
}
