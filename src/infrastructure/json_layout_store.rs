// Flat-file layout store
use crate::application::layout_repository::LayoutRepository;
use crate::domain::widget::Layout;
use anyhow::Context;
use async_trait::async_trait;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Keeps the layout as one pretty-printed JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonLayoutStore {
    path: PathBuf,
}

impl JsonLayoutStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

}

/// Write to a fresh temp file beside `path`, sync it, then rename it into place.
/// The temp file is removed if any step fails.
fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent().filter(|d| !d.as_os_str().is_empty()) {
        Some(dir) => dir,
        None => Path::new("."),
    };
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[async_trait]
impl LayoutRepository for JsonLayoutStore {
    async fn load(&self) -> anyhow::Result<Option<Layout>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No layout at {}, starting empty", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read layout {}", self.path.display()));
            }
        };

        match serde_json::from_str::<Layout>(&content) {
            Ok(layout) => Ok(Some(layout)),
            Err(e) => {
                tracing::warn!("Ignoring malformed layout {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    async fn save(&self, layout: &Layout) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(layout).context("Failed to serialize layout")?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &json))
            .await
            .context("Layout write task panicked")??;

        tracing::debug!("Saved {} widgets to {}", layout.len(), self.path.display());
        Ok(())
    }
}
