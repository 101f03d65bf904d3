//! The regeneration pipeline.
//!
//! [`IconFontPipeline`] owns one instance of each collaborator and runs a
//! rebuild cycle in a fixed order:
//!
//! 1. font compiler `generate` + `write`
//! 2. `@font-face` `src` assembly
//! 3. asset rendering
//! 4. host `publish`, then `rebuild_done`
//!
//! Any phase failing aborts the cycle; earlier outputs stay in place.

use crate::assets::{
    AssetRenderer, DEFAULT_FONT_FACE_TEMPLATE, DEFAULT_VARS_TEMPLATE, RenderContext,
    TemplateRenderer,
};
use crate::catalog::{DirectoryCatalog, IconCatalog, is_icon_path};
use crate::compiler::{CommandFontCompiler, CompilerOptions, FontCompiler};
use crate::font_face::{SrcOptions, build_src, public_url_path};
use crate::formats::normalize;
use crate::host::{AssetHost, FileHost};
use crate::scheduler::{ChangeFilter, ChangeKind, IconChange, RebuildTarget};
use anyhow::{Context, Result};
use icon_font_config::{Case, Config, FontFormat};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the compiler work directory inside the build directory.
const WORK_DIR_NAME: &str = "work";

/// Validated, resolved settings for one pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub name: String,
    pub case: Case,
    /// Unicode base code point
    pub unicode: u32,
    /// Normalized format list
    pub formats: Vec<FontFormat>,
    pub source_dir: PathBuf,
    /// Where compiled fonts are written
    pub target_dir: PathBuf,
    /// Where the CSS assets are written
    pub build_dir: PathBuf,
    /// Compiler manifest and intermediate output
    pub work_dir: PathBuf,
    pub src: SrcOptions,
    pub debounce: Duration,
}

impl PipelineSettings {
    /// Validate `config` and resolve its directories against `root`.
    pub fn from_config(config: &Config, root: &Path) -> Result<Self> {
        config.validate().context("Invalid icon font configuration")?;
        let unicode = config.unicode_base()?;
        let formats = normalize(&config.formats);

        // Watch events carry canonical paths; match them when the directory exists
        let source_dir = config.source_path(root);
        let source_dir = std::fs::canonicalize(&source_dir).unwrap_or(source_dir);

        let target_dir = config.target_path(root);
        let build_dir = config.build_path(root);
        let work_dir = build_dir.join(WORK_DIR_NAME);
        let src = SrcOptions {
            url_base: public_url_path(&target_dir, &config.public_dir),
            asset_name: config.name.clone(),
            inline_base64: config.base64,
        };

        Ok(Self {
            name: config.name.clone(),
            case: config.case,
            unicode,
            formats,
            source_dir,
            target_dir,
            build_dir,
            work_dir,
            src,
            debounce: Duration::from_millis(config.debounce_delay_ms),
        })
    }

    pub fn compiler_options(&self) -> CompilerOptions {
        CompilerOptions {
            name: self.name.clone(),
            formats: self.formats.clone(),
            unicode: self.unicode,
        }
    }

    /// Filter selecting changes that concern the icon sources.
    pub fn change_filter(&self) -> ChangeFilter {
        ChangeFilter::new(&self.source_dir)
    }
}

/// Catalog, compiler, renderer and host wired into one rebuild pipeline.
#[derive(Debug)]
pub struct IconFontPipeline<C, F, R, H> {
    settings: PipelineSettings,
    catalog: C,
    compiler: F,
    renderer: R,
    host: H,
    font_face_src: String,
}

/// Pipeline built from the shipped collaborators.
pub type DefaultPipeline =
    IconFontPipeline<DirectoryCatalog, CommandFontCompiler, TemplateRenderer, FileHost>;

impl DefaultPipeline {
    /// Build the shipped pipeline for `config` rooted at `root`.
    pub fn from_config(config: &Config, root: &Path) -> Result<Self> {
        let settings = PipelineSettings::from_config(config, root)?;

        let catalog = DirectoryCatalog::new(&settings.source_dir);
        let command = config.compiler.command.clone().unwrap_or_default();
        let compiler =
            CommandFontCompiler::new(settings.compiler_options(), &command, &settings.work_dir)
                .context("Failed to set up the font compiler")?;
        let renderer = TemplateRenderer::new(
            config.templates.vars.as_deref().unwrap_or(DEFAULT_VARS_TEMPLATE),
            config
                .templates
                .font_face
                .as_deref()
                .unwrap_or(DEFAULT_FONT_FACE_TEMPLATE),
        )
        .context("Failed to parse CSS templates")?;
        let host = FileHost::new(&settings.build_dir);

        Ok(Self::new(settings, catalog, compiler, renderer, host))
    }
}

impl<C, F, R, H> IconFontPipeline<C, F, R, H>
where
    C: IconCatalog,
    F: FontCompiler,
    R: AssetRenderer,
    H: AssetHost,
{
    pub fn new(settings: PipelineSettings, catalog: C, compiler: F, renderer: R, host: H) -> Self {
        Self {
            settings,
            catalog,
            compiler,
            renderer,
            host,
            font_face_src: String::new(),
        }
    }

    /// Scan the source directory and run the first rebuild.
    pub async fn initialize(&mut self) -> Result<()> {
        self.catalog
            .read(None)
            .await
            .context("Failed to read icon sources")?;
        self.rebuild().await
    }

    /// Apply one change notification to the catalog.
    ///
    /// An unlink of a non-`.svg` path is taken to be a removed directory and
    /// drops every icon below it. Returns whether the catalog may have
    /// changed.
    pub async fn apply_change(&mut self, change: &IconChange) -> Result<bool> {
        let path = change.path.as_path();
        let result = match change.kind {
            ChangeKind::Add => self.catalog.read(Some(path)).await.map(|()| true),
            ChangeKind::Unlink if !is_icon_path(path) => {
                self.catalog.delete_dir(path).await.map(|removed| removed > 0)
            }
            ChangeKind::Unlink => self.catalog.delete(path).await.map(|()| true),
            ChangeKind::Change => self.catalog.update(path).await.map(|()| true),
        };
        result.with_context(|| {
            format!("Failed to apply {:?} for {}", change.kind, path.display())
        })
    }

    /// Run one full rebuild cycle.
    pub async fn rebuild(&mut self) -> Result<()> {
        let icons = self.catalog.icons();
        log::debug!(
            "Rebuilding '{}' with {} icon(s)",
            self.settings.name,
            icons.len()
        );

        self.compiler
            .generate(icons)
            .await
            .context("Font compilation failed")?;
        self.compiler
            .write(&self.settings.target_dir)
            .await
            .context("Failed to write font files")?;

        self.font_face_src = build_src(
            &self.settings.formats,
            self.compiler.fonts(),
            &self.settings.src,
        );

        let context = RenderContext {
            name: &self.settings.name,
            case: self.settings.case,
            unicode: self.settings.unicode,
            icons: self.catalog.icons(),
            font_face_src: &self.font_face_src,
        };
        self.renderer
            .generate(&context)
            .context("Failed to render CSS assets")?;

        self.host
            .publish(self.renderer.assets())
            .await
            .context("Failed to publish CSS assets")?;
        self.host.rebuild_done();
        Ok(())
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn compiler(&self) -> &F {
        &self.compiler
    }

    pub fn compiler_mut(&mut self) -> &mut F {
        &mut self.compiler
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// `src` descriptor from the last rebuild.
    pub fn font_face_src(&self) -> &str {
        &self.font_face_src
    }
}

impl<C, F, R, H> RebuildTarget for IconFontPipeline<C, F, R, H>
where
    C: IconCatalog,
    F: FontCompiler,
    R: AssetRenderer,
    H: AssetHost,
{
    async fn apply_change(&mut self, change: &IconChange) -> Result<bool> {
        IconFontPipeline::apply_change(self, change).await
    }

    async fn rebuild(&mut self) -> Result<()> {
        IconFontPipeline::rebuild(self).await
    }
}
