//! Icon font generator.
//!
//! Turns a directory of SVG icons into font files plus two CSS assets
//! (`vars.css` and `font-face.css`), and regenerates them incrementally as
//! icons change.
//!
//! Data flow in watch mode:
//!
//! ```text
//! SourceWatcher -> RebuildScheduler -> IconCatalog mutation
//!     -> FontCompiler (generate + write) -> build_src
//!     -> AssetRenderer -> AssetHost (publish, rebuild_done)
//! ```

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod debug;

pub mod app;
pub mod assets;
pub mod catalog;
pub mod cli;
pub mod compiler;
pub mod error;
pub mod font_face;
pub mod formats;
pub mod host;
pub mod pipeline;
pub mod scheduler;
pub mod watcher;

pub use icon_font_config as config;
