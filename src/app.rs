//! Build and watch runs.

use crate::catalog::IconCatalog;
use crate::cli::{Mode, RuntimeOptions};
use crate::pipeline::DefaultPipeline;
use crate::scheduler::RebuildScheduler;
use crate::watcher::SourceWatcher;
use anyhow::{Context, Result};
use icon_font_config::Config;
use std::future::Future;
use std::path::Path;

/// Load the config and run the requested mode to completion.
pub async fn run(options: &RuntimeOptions) -> Result<()> {
    let config = Config::load(&options.config_path)?;
    crate::debug::apply_config_level(config.log_level);

    let root = options
        .root
        .canonicalize()
        .with_context(|| format!("Project root not found: {}", options.root.display()))?;

    match options.mode {
        Mode::Build => build(&config, &root).await,
        Mode::Watch => watch(&config, &root, shutdown_signal()).await,
    }
}

/// Generate the fonts and CSS once.
pub async fn build(config: &Config, root: &Path) -> Result<()> {
    let mut pipeline = DefaultPipeline::from_config(config, root)?;
    pipeline.initialize().await?;
    log::info!(
        "Built '{}' ({} icon(s)) into {}",
        pipeline.settings().name,
        pipeline.catalog().icons().len(),
        pipeline.settings().build_dir.display()
    );
    Ok(())
}

/// Generate, then keep regenerating on source changes until `shutdown`
/// completes.
///
/// A failed initial generation is logged and watching continues, so fixing
/// the offending icon triggers the next attempt.
pub async fn watch(
    config: &Config,
    root: &Path,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let mut pipeline = DefaultPipeline::from_config(config, root)?;
    if let Err(e) = pipeline.initialize().await {
        log::error!("Initial icon font build failed: {:#}", e);
    }

    let settings = pipeline.settings().clone();
    let (_watcher, changes) = SourceWatcher::start(&settings.source_dir)?;

    let mut scheduler =
        RebuildScheduler::new(pipeline, settings.change_filter(), settings.debounce);
    scheduler.run(changes, shutdown).await;

    log::info!(
        "Stopped watching after {} rebuild(s), {} failed",
        scheduler.cycles(),
        scheduler.failures()
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Interrupted");
}

