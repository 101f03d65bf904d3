//! Configuration system for the icon-font generator.
//!
//! This crate provides configuration loading, saving, validation and default
//! values. It includes:
//!
//! - The [`Config`] struct and its YAML persistence
//! - Font format identifiers and their canonical priority order
//! - Case styles used to name generated CSS custom properties
//! - `${VAR}` environment substitution for config files

pub mod config;
pub mod defaults;
pub mod error;
mod types;

// Re-export main types for convenience
pub use config::{CompilerConfig, Config, TemplateConfig, substitute_variables};
pub use error::ConfigError;
pub use types::{CANONICAL_FORMAT_ORDER, Case, FontFormat, LogLevel, parse_unicode};
