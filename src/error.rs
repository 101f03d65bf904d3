//! Typed error types for the icon-font collaborators.
//!
//! Each collaborator boundary (catalog, compiler, template renderer) has its
//! own enum so the pipeline can report which phase of a rebuild failed.
//! Orchestration code wraps these in `anyhow` with added context.

use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or mutating the icon catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// An icon source or the source directory could not be read.
    #[error("Failed to read icon source '{}': {source}", .path.display())]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The path is not an `.svg` file inside the source directory.
    #[error("'{}' is not an icon source under {}", .path.display(), .source_dir.display())]
    NotAnIcon {
        /// Offending path.
        path: PathBuf,
        /// Configured source directory.
        source_dir: PathBuf,
    },
}

/// Failures compiling or writing fonts.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The compiler command line could not be split into arguments.
    #[error("Invalid compiler command '{command}': {details}")]
    InvalidCommand {
        /// Command line as configured.
        command: String,
        /// Parser error details.
        details: String,
    },

    /// The compiler process could not be started.
    #[error("Failed to spawn font compiler '{program}': {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The compiler exited unsuccessfully for a format.
    #[error("Font compiler failed for format '{format}' ({status}): {stderr}")]
    Failed {
        /// Format being compiled.
        format: String,
        /// Exit status description.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The icon manifest could not be serialized.
    #[error("Failed to serialize icon manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Reading compiler output or writing font files failed.
    #[error("Font file I/O failed for '{}': {source}", .path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Failures rendering the CSS templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A `{{placeholder}}` is not known in its scope.
    #[error("Unknown template placeholder '{{{{{0}}}}}'")]
    UnknownPlaceholder(String),

    /// A section was opened but never closed.
    #[error("Unclosed template section '{{{{#{0}}}}}'")]
    UnclosedSection(String),

    /// A closing tag without a matching opening tag.
    #[error("Unexpected closing tag '{{{{/{0}}}}}'")]
    UnexpectedClose(String),
}
