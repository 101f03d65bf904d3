//! Shared integration test helpers for icon-font.
//!
//! Rust integration tests use `mod common;` (not `use`) to bring in helpers
//! from `tests/common/mod.rs`. The `#[allow(dead_code)]` attribute
//! suppresses warnings when only a subset of helpers are used per file.

#![allow(dead_code)]

use icon_font::assets::{RenderedAssets, TemplateRenderer};
use icon_font::catalog::{DirectoryCatalog, IconEntry};
use icon_font::compiler::{CompiledFont, FontCompiler};
use icon_font::error::CompileError;
use icon_font::host::AssetHost;
use icon_font::pipeline::{IconFontPipeline, PipelineSettings};
use icon_font::scheduler::{IconChange, RebuildTarget};
use icon_font_config::{Case, Config, FontFormat};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::time::Instant;

/// Minimal SVG body; the pipeline never inspects icon content.
pub const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"/>"#;

/// Write an icon source at `relative` under `source_dir`.
pub fn write_icon(source_dir: &Path, relative: &str) -> PathBuf {
    let path = source_dir.join(relative);
    fs::create_dir_all(path.parent().expect("icon path has a parent"))
        .expect("Failed to create icon dir");
    fs::write(&path, SVG).expect("Failed to write icon");
    path
}

/// A temporary project with a config and an icon source directory.
///
/// The `TempDir` must be kept alive for the duration of the test.
pub struct Project {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    /// Project with the default config, identity case and `icons` written
    /// into the source directory.
    pub fn new(icons: &[&str]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp dir");
        let config = Config::new()
            .with_case(Case::Identity)
            .with_compiler_command("unused {output}");

        let source_dir = config.source_path(&root);
        fs::create_dir_all(&source_dir).expect("Failed to create source dir");
        for icon in icons {
            write_icon(&source_dir, icon);
        }

        Self {
            temp_dir,
            root,
            config,
        }
    }

    pub fn source_dir(&self) -> PathBuf {
        self.config.source_path(&self.root)
    }

    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings::from_config(&self.config, &self.root).expect("valid test config")
    }

    /// Pipeline over the real catalog and renderer with a fake compiler and
    /// an in-memory host.
    pub fn pipeline(&self) -> TestPipeline {
        let settings = self.settings();
        let catalog = DirectoryCatalog::new(&settings.source_dir);
        let compiler = FakeCompiler::new(settings.formats.clone());
        IconFontPipeline::new(
            settings,
            catalog,
            compiler,
            TemplateRenderer::with_defaults(),
            MemoryHost::default(),
        )
    }
}

pub type TestPipeline =
    IconFontPipeline<DirectoryCatalog, FakeCompiler, TemplateRenderer, MemoryHost>;

/// Compiler producing `<format>:<icon names>` as font bytes.
#[derive(Debug, Default)]
pub struct FakeCompiler {
    pub formats: Vec<FontFormat>,
    pub fonts: HashMap<FontFormat, CompiledFont>,
    pub generate_calls: usize,
    pub fail_next: bool,
}

impl FakeCompiler {
    pub fn new(formats: Vec<FontFormat>) -> Self {
        Self {
            formats,
            ..Self::default()
        }
    }
}

impl FontCompiler for FakeCompiler {
    async fn generate(&mut self, icons: &[IconEntry]) -> Result<(), CompileError> {
        self.generate_calls += 1;
        if std::mem::take(&mut self.fail_next) {
            return Err(CompileError::Failed {
                format: "woff".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "glyph overflow".to_string(),
            });
        }

        let names: Vec<&str> = icons.iter().map(|icon| icon.name.as_str()).collect();
        self.fonts = self
            .formats
            .iter()
            .map(|format| {
                let bytes = format!("{}:{}", format, names.join(",")).into_bytes();
                (format.clone(), CompiledFont::new(format.clone(), bytes))
            })
            .collect();
        Ok(())
    }

    async fn write(&self, _target_dir: &Path) -> Result<(), CompileError> {
        Ok(())
    }

    fn fonts(&self) -> &HashMap<FontFormat, CompiledFont> {
        &self.fonts
    }
}

/// Host keeping published assets in memory.
#[derive(Debug, Default)]
pub struct MemoryHost {
    pub published: Vec<RenderedAssets>,
    pub rebuilds_done: usize,
}

impl MemoryHost {
    pub fn last(&self) -> &RenderedAssets {
        self.published.last().expect("nothing published yet")
    }
}

impl AssetHost for MemoryHost {
    async fn publish(&mut self, assets: &RenderedAssets) -> anyhow::Result<()> {
        self.published.push(assets.clone());
        Ok(())
    }

    fn rebuild_done(&mut self) {
        self.rebuilds_done += 1;
    }
}

/// Rebuild target recording what the scheduler asked of it and when.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub applied: Vec<IconChange>,
    pub rebuilds: Vec<Instant>,
}

impl RebuildTarget for RecordingTarget {
    async fn apply_change(&mut self, change: &IconChange) -> anyhow::Result<bool> {
        self.applied.push(change.clone());
        Ok(true)
    }

    async fn rebuild(&mut self) -> anyhow::Result<()> {
        self.rebuilds.push(Instant::now());
        Ok(())
    }
}
