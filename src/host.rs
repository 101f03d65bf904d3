//! Host side of the pipeline: where rendered assets go and who is told
//! that a rebuild finished.

use crate::assets::RenderedAssets;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Receives the rendered CSS assets after each successful rebuild.
// Driven from a single task; the futures need not be Send.
#[allow(async_fn_in_trait)]
pub trait AssetHost {
    /// Store the two assets under their registered file names.
    async fn publish(&mut self, assets: &RenderedAssets) -> Result<()>;

    /// Called once a rebuild has fully completed.
    fn rebuild_done(&mut self);
}

/// Host writing `vars.css` and `font-face.css` into a build directory.
#[derive(Debug, Clone)]
pub struct FileHost {
    build_dir: PathBuf,
    rebuilds: u64,
}

impl FileHost {
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
            rebuilds: 0,
        }
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Number of completed rebuilds.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}

impl AssetHost for FileHost {
    async fn publish(&mut self, assets: &RenderedAssets) -> Result<()> {
        tokio::fs::create_dir_all(&self.build_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create build directory {}",
                    self.build_dir.display()
                )
            })?;

        for (file_name, contents) in assets.files() {
            let path = self.build_dir.join(file_name);
            // Atomic save: write to temp file then rename so readers never see a partial sheet
            let temp_path = path.with_extension("css.tmp");
            tokio::fs::write(&temp_path, contents)
                .await
                .with_context(|| format!("Failed to write {}", temp_path.display()))?;
            tokio::fs::rename(&temp_path, &path)
                .await
                .with_context(|| format!("Failed to replace {}", path.display()))?;
            log::debug!("Published {}", path.display());
        }
        Ok(())
    }

    fn rebuild_done(&mut self) {
        self.rebuilds += 1;
        log::info!(
            "Icon font assets updated in {} (rebuild #{})",
            self.build_dir.display(),
            self.rebuilds
        );
    }
}
