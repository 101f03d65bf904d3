//! Core `Config` struct definition.
//!
//! # Sub-modules
//!
//! - [`env_vars`] — `${VAR}` substitution applied to the raw YAML
//! - [`persistence`] — YAML `load` / `save`

pub mod env_vars;
mod persistence;

pub use env_vars::substitute_variables;

use crate::error::ConfigError;
use crate::types::{Case, FontFormat, LogLevel, parse_unicode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Accepts the unicode base either as a string (`"0xe900"`) or as a bare YAML
/// integer (`0xe900`, `59648`), normalising integers to hex notation.
fn deserialize_unicode<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        Int(u64),
        Str(String),
    }

    Ok(match StringOrInt::deserialize(deserializer)? {
        StringOrInt::Int(n) => format!("{n:#x}"),
        StringOrInt::Str(s) => s,
    })
}

/// External font compiler settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompilerConfig {
    /// Command line run once per font format.
    ///
    /// Split with shell quoting rules; `{manifest}`, `{format}`, `{output}` and
    /// `{name}` are substituted in every argument.
    #[serde(default)]
    pub command: Option<String>,
}

/// Optional overrides for the two built-in CSS templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TemplateConfig {
    /// Template for `vars.css`
    #[serde(default)]
    pub vars: Option<String>,
    /// Template for `font-face.css`
    #[serde(default)]
    pub font_face: Option<String>,
}

/// Icon font generator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    // ========================================================================
    // Font identity
    // ========================================================================
    /// Font family name; also the base name of the compiled font files
    #[serde(default = "crate::defaults::name")]
    pub name: String,

    /// Font formats to compile, in any order
    #[serde(default = "crate::defaults::formats")]
    pub formats: Vec<FontFormat>,

    /// First code point assigned to icons (`0xE900`, `U+E900` or decimal)
    #[serde(
        default = "crate::defaults::unicode",
        deserialize_with = "deserialize_unicode"
    )]
    pub unicode: String,

    /// Case style for generated CSS custom property names
    #[serde(default = "crate::defaults::case")]
    pub case: Case,

    /// Embed the font in `font-face.css` as a base64 data URI
    #[serde(default = "crate::defaults::base64")]
    pub base64: bool,

    // ========================================================================
    // Directories (relative paths resolve against the project root)
    // ========================================================================
    /// Directory holding the `.svg` icon sources
    #[serde(default = "crate::defaults::source_dir")]
    pub source_dir: String,

    /// Publicly served directory; stripped from font URLs
    #[serde(default = "crate::defaults::public_dir")]
    pub public_dir: String,

    /// Font output directory, relative to `public_dir`
    #[serde(default = "crate::defaults::target_dir")]
    pub target_dir: String,

    /// Directory receiving `vars.css` and `font-face.css`
    #[serde(default = "crate::defaults::build_dir")]
    pub build_dir: String,

    // ========================================================================
    // Watch mode
    // ========================================================================
    /// Quiet period after the last change before a rebuild starts
    #[serde(default = "crate::defaults::debounce_delay_ms")]
    pub debounce_delay_ms: u64,

    // ========================================================================
    // Collaborators
    // ========================================================================
    #[serde(default)]
    pub compiler: CompilerConfig,

    #[serde(default)]
    pub templates: TemplateConfig,

    // ========================================================================
    // Logging
    // ========================================================================
    #[serde(default = "crate::defaults::log_level")]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: crate::defaults::name(),
            formats: crate::defaults::formats(),
            unicode: crate::defaults::unicode(),
            case: crate::defaults::case(),
            base64: crate::defaults::base64(),
            source_dir: crate::defaults::source_dir(),
            public_dir: crate::defaults::public_dir(),
            target_dir: crate::defaults::target_dir(),
            build_dir: crate::defaults::build_dir(),
            debounce_delay_ms: crate::defaults::debounce_delay_ms(),
            compiler: CompilerConfig::default(),
            templates: TemplateConfig::default(),
            log_level: crate::defaults::log_level(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font family name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the requested font formats
    pub fn with_formats(mut self, formats: impl IntoIterator<Item = FontFormat>) -> Self {
        self.formats = formats.into_iter().collect();
        self
    }

    /// Set the CSS custom property case style
    pub fn with_case(mut self, case: Case) -> Self {
        self.case = case;
        self
    }

    /// Enable or disable base64 inlining
    pub fn with_base64(mut self, base64: bool) -> Self {
        self.base64 = base64;
        self
    }

    /// Set the external font compiler command
    pub fn with_compiler_command(mut self, command: impl Into<String>) -> Self {
        self.compiler.command = Some(command.into());
        self
    }

    /// Parsed unicode base code point.
    pub fn unicode_base(&self) -> Result<u32, ConfigError> {
        parse_unicode(&self.unicode)
    }

    /// Check every setting that must hold before the pipeline starts.
    ///
    /// Fails on the first problem found: empty or path-like font name,
    /// unsupported formats, an invalid unicode base, or formats requested
    /// without a compiler command.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation("name: must not be empty".to_string()));
        }
        if self.name.contains(['/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "name: '{}' must not contain path separators",
                self.name
            )));
        }

        let unsupported: Vec<&str> = self
            .formats
            .iter()
            .filter(|f| !f.is_supported())
            .map(FontFormat::as_str)
            .collect();
        if !unsupported.is_empty() {
            return Err(ConfigError::Validation(format!(
                "formats: unsupported font format(s): {} (expected eot, woff2, woff, ttf or svg)",
                unsupported.join(", ")
            )));
        }

        self.unicode_base()?;

        let has_command = self
            .compiler
            .command
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        if !self.formats.is_empty() && !has_command {
            return Err(ConfigError::Validation(
                "compiler.command: required to compile font formats".to_string(),
            ));
        }

        if self.formats.is_empty() {
            log::warn!("No font formats configured; font-face.css will have an empty src");
        }
        Ok(())
    }

    /// Absolute icon source directory under `root`.
    pub fn source_path(&self, root: &Path) -> PathBuf {
        root.join(&self.source_dir)
    }

    /// Absolute public directory under `root`.
    pub fn public_path(&self, root: &Path) -> PathBuf {
        root.join(&self.public_dir)
    }

    /// Absolute font output directory (`<public_dir>/<target_dir>`) under `root`.
    pub fn target_path(&self, root: &Path) -> PathBuf {
        self.public_path(root).join(&self.target_dir)
    }

    /// Absolute CSS output directory under `root`.
    pub fn build_path(&self, root: &Path) -> PathBuf {
        root.join(&self.build_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config::new().with_compiler_command("fontc {manifest} -o {output}")
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.name, "icon-font");
        assert_eq!(config.source_dir, "assets/icon-font");
        assert_eq!(config.target_dir, "icon-font");
        assert_eq!(config.formats, vec![FontFormat::Woff2, FontFormat::Woff]);
        assert!(config.base64);
        assert_eq!(config.case, Case::Kebab);
        assert_eq!(config.debounce_delay_ms, 100);
        assert_eq!(config.unicode_base().unwrap(), 0xe900);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml_ng::from_str("name: glyphs\nbase64: false\n").unwrap();
        assert_eq!(config.name, "glyphs");
        assert!(!config.base64);
        assert_eq!(config.public_dir, "public");
        assert_eq!(config.compiler, CompilerConfig::default());
    }

    #[test]
    fn test_unicode_accepts_bare_integer() {
        let config: Config = serde_yaml_ng::from_str("unicode: 59648\n").unwrap();
        assert_eq!(config.unicode, "0xe900");
        assert_eq!(config.unicode_base().unwrap(), 0xe900);

        let quoted: Config = serde_yaml_ng::from_str("unicode: \"U+F000\"\n").unwrap();
        assert_eq!(quoted.unicode_base().unwrap(), 0xf000);
    }

    #[test]
    fn test_validate_accepts_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unsupported_format() {
        let config = valid_config().with_formats([FontFormat::Woff, FontFormat::from("otf")]);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("otf")));
    }

    #[test]
    fn test_validate_rejects_bad_unicode() {
        let mut config = valid_config();
        config.unicode = "0xzz".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_compiler_command() {
        let config = Config::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("compiler.command"));

        let no_formats = Config::new().with_formats(Vec::new());
        assert!(no_formats.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_name() {
        assert!(valid_config().with_name("  ").validate().is_err());
        assert!(valid_config().with_name("a/b").validate().is_err());
    }

    #[test]
    fn test_path_resolution() {
        let config = Config::default();
        let root = Path::new("/project");
        assert_eq!(
            config.source_path(root),
            PathBuf::from("/project/assets/icon-font")
        );
        assert_eq!(
            config.target_path(root),
            PathBuf::from("/project/public/icon-font")
        );
        assert_eq!(config.build_path(root), PathBuf::from("/project/.icon-font"));
    }
}
