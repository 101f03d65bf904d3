//! Icon catalog: the live mapping from icon name to code point offset.
//!
//! [`DirectoryCatalog`] discovers `.svg` sources under the configured source
//! directory. Icons are named after their path relative to that directory
//! (`arrows/left.svg` becomes `arrows-left`) and receive the offset of their
//! position in the catalog, so the initial scan order (sorted by relative
//! path) determines code points. Additions append; deletions shift every
//! following icon down by one.
//!
//! Two sources can map to the same name (`a/b.svg` and `a-b.svg`). The
//! first one catalogued owns the name; the other is skipped with a warning
//! and deleting it leaves the owner in place.

use crate::error::CatalogError;
use std::path::{Path, PathBuf};

/// File extension of icon sources.
pub const ICON_EXTENSION: &str = "svg";

/// One catalogued icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconEntry {
    /// Icon name used in CSS custom properties
    pub name: String,
    /// Offset added to the configured unicode base
    pub unicode_offset: u32,
    /// Source file
    pub path: PathBuf,
}

impl IconEntry {
    /// Absolute code point for a given unicode base.
    pub fn code_point(&self, unicode_base: u32) -> u32 {
        unicode_base + self.unicode_offset
    }
}

/// Whether `path` has the icon source extension (case-insensitive).
pub fn is_icon_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ICON_EXTENSION))
}

/// Source of icon metadata, mutated by path as files change on disk.
// Driven from a single task; the futures need not be Send.
#[allow(async_fn_in_trait)]
pub trait IconCatalog {
    /// Scan the whole source directory (`None`) or add a single icon.
    async fn read(&mut self, path: Option<&Path>) -> Result<(), CatalogError>;

    /// Refresh an icon whose source changed.
    async fn update(&mut self, path: &Path) -> Result<(), CatalogError>;

    /// Remove an icon whose source was deleted.
    async fn delete(&mut self, path: &Path) -> Result<(), CatalogError>;

    /// Remove every icon whose source lies under `dir`, after the directory
    /// itself was removed or moved away. Returns how many were removed.
    async fn delete_dir(&mut self, dir: &Path) -> Result<usize, CatalogError>;

    /// Current icons in code point order.
    fn icons(&self) -> &[IconEntry];
}

/// Catalog backed by a directory of `.svg` files.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    source_dir: PathBuf,
    icons: Vec<IconEntry>,
}

impl DirectoryCatalog {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            icons: Vec::new(),
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Derive the icon name from a source path.
    pub fn icon_name(&self, path: &Path) -> Result<String, CatalogError> {
        let not_an_icon = || CatalogError::NotAnIcon {
            path: path.to_path_buf(),
            source_dir: self.source_dir.clone(),
        };

        if !is_icon_path(path) {
            return Err(not_an_icon());
        }
        let relative = path.strip_prefix(&self.source_dir).map_err(|_| not_an_icon())?;
        let relative = relative.with_extension("");

        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            return Err(not_an_icon());
        }
        Ok(parts.join("-"))
    }

    async fn ensure_file(path: &Path) -> Result<(), CatalogError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        if metadata.is_file() {
            Ok(())
        } else {
            Err(CatalogError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            })
        }
    }

    /// Insert the icon named `name`, unless another source already owns it.
    fn upsert(&mut self, name: String, path: &Path) {
        if let Some(entry) = self.icons.iter().find(|icon| icon.name == name) {
            if entry.path != path {
                log::warn!(
                    "Catalog: {} and {} both map to icon '{}'; keeping {}",
                    entry.path.display(),
                    path.display(),
                    name,
                    entry.path.display()
                );
            }
            return;
        }
        let unicode_offset = self.icons.len() as u32;
        log::debug!("Catalog: added icon '{}' at offset {}", name, unicode_offset);
        self.icons.push(IconEntry {
            name,
            unicode_offset,
            path: path.to_path_buf(),
        });
    }

    fn reindex(&mut self) {
        for (offset, icon) in self.icons.iter_mut().enumerate() {
            icon.unicode_offset = offset as u32;
        }
    }

    /// Recursively collect icon source paths, sorted.
    async fn scan(&self) -> Result<Vec<PathBuf>, CatalogError> {
        let mut found = Vec::new();
        let mut pending = vec![self.source_dir.clone()];

        while let Some(dir) = pending.pop() {
            let io_err = |source| CatalogError::Io {
                path: dir.clone(),
                source,
            };
            let mut entries = tokio::fs::read_dir(&dir).await.map_err(io_err)?;
            while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
                let path = entry.path();
                let file_type = entry.file_type().await.map_err(io_err)?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if is_icon_path(&path) {
                    found.push(path);
                }
            }
        }

        found.sort();
        Ok(found)
    }
}

impl IconCatalog for DirectoryCatalog {
    async fn read(&mut self, path: Option<&Path>) -> Result<(), CatalogError> {
        match path {
            Some(path) => {
                let name = self.icon_name(path)?;
                Self::ensure_file(path).await?;
                self.upsert(name, path);
            }
            None => {
                let paths = self.scan().await?;
                self.icons.clear();
                for path in &paths {
                    let name = self.icon_name(path)?;
                    self.upsert(name, path);
                }
                log::info!(
                    "Catalog: found {} icon(s) in {}",
                    self.icons.len(),
                    self.source_dir.display()
                );
            }
        }
        Ok(())
    }

    async fn update(&mut self, path: &Path) -> Result<(), CatalogError> {
        let name = self.icon_name(path)?;
        Self::ensure_file(path).await?;
        self.upsert(name, path);
        Ok(())
    }

    async fn delete(&mut self, path: &Path) -> Result<(), CatalogError> {
        let name = self.icon_name(path)?;
        let Some(index) = self.icons.iter().position(|icon| icon.name == name) else {
            log::debug!("Catalog: '{}' was not catalogued", name);
            return Ok(());
        };
        if self.icons[index].path != path {
            log::debug!(
                "Catalog: '{}' is owned by {}; keeping it",
                name,
                self.icons[index].path.display()
            );
            return Ok(());
        }

        self.icons.remove(index);
        log::debug!("Catalog: removed icon '{}'", name);
        self.reindex();
        Ok(())
    }

    async fn delete_dir(&mut self, dir: &Path) -> Result<usize, CatalogError> {
        if !dir.starts_with(&self.source_dir) || dir == self.source_dir {
            return Err(CatalogError::NotAnIcon {
                path: dir.to_path_buf(),
                source_dir: self.source_dir.clone(),
            });
        }

        let before = self.icons.len();
        self.icons.retain(|icon| !icon.path.starts_with(dir));
        let removed = before - self.icons.len();
        if removed > 0 {
            log::debug!(
                "Catalog: removed {} icon(s) under {}",
                removed,
                dir.display()
            );
            self.reindex();
        }
        Ok(removed)
    }

    fn icons(&self) -> &[IconEntry] {
        &self.icons
    }
}
