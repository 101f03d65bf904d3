//! Configuration value types: font formats, case styles and log levels.

use crate::error::ConfigError;
use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical priority order of the supported font formats.
///
/// Legacy formats come first so that the `@font-face` `src` list degrades
/// from the IE-only `eot` fallback through the modern formats to `svg`.
pub const CANONICAL_FORMAT_ORDER: [FontFormat; 5] = [
    FontFormat::Eot,
    FontFormat::Woff2,
    FontFormat::Woff,
    FontFormat::Ttf,
    FontFormat::Svg,
];

/// A font format identifier as written in the config file.
///
/// Identifiers outside the supported set are kept as [`FontFormat::Other`] so
/// they can be reported by validation instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontFormat {
    /// Embedded OpenType (legacy Internet Explorer)
    Eot,
    /// WOFF 2.0
    Woff2,
    /// WOFF 1.0
    Woff,
    /// TrueType
    Ttf,
    /// SVG font
    Svg,
    /// Any unrecognised identifier (lowercased)
    Other(String),
}

impl FontFormat {
    /// Identifier string, also used as the file extension.
    pub fn as_str(&self) -> &str {
        match self {
            FontFormat::Eot => "eot",
            FontFormat::Woff2 => "woff2",
            FontFormat::Woff => "woff",
            FontFormat::Ttf => "ttf",
            FontFormat::Svg => "svg",
            FontFormat::Other(name) => name,
        }
    }

    /// Position in [`CANONICAL_FORMAT_ORDER`], or `None` for unknown formats.
    pub fn priority(&self) -> Option<usize> {
        CANONICAL_FORMAT_ORDER.iter().position(|known| known == self)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FontFormat::Other(_))
    }
}

impl From<String> for FontFormat {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "eot" => FontFormat::Eot,
            "woff2" => FontFormat::Woff2,
            "woff" => FontFormat::Woff,
            "ttf" => FontFormat::Ttf,
            "svg" => FontFormat::Svg,
            other => FontFormat::Other(other.to_string()),
        }
    }
}

impl From<&str> for FontFormat {
    fn from(value: &str) -> Self {
        FontFormat::from(value.to_string())
    }
}

impl From<FontFormat> for String {
    fn from(value: FontFormat) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FontFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case style applied to `<font name>-<icon name>` when naming CSS custom
/// properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Case {
    /// `icon-font-arrow-left`
    #[default]
    Kebab,
    /// `iconFontArrowLeft`
    Camel,
    /// `IconFontArrowLeft`
    Pascal,
    /// `icon_font_arrow_left`
    Snake,
    /// `ICON_FONT_ARROW_LEFT`
    Constant,
    /// Name used verbatim
    Identity,
}

impl Case {
    /// Convert `input` to this case style.
    pub fn apply(self, input: &str) -> String {
        match self {
            Case::Kebab => input.to_kebab_case(),
            Case::Camel => input.to_lower_camel_case(),
            Case::Pascal => input.to_upper_camel_case(),
            Case::Snake => input.to_snake_case(),
            Case::Constant => input.to_shouty_snake_case(),
            Case::Identity => input.to_string(),
        }
    }
}

/// Log verbosity selectable from the config file or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    #[default]
    Info,
    /// Debug messages
    Debug,
    /// Most verbose
    Trace,
}

impl LogLevel {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Parse the configured unicode base code point.
///
/// Accepts `0xE900`, `U+E900` or a plain decimal number. The result must be a
/// valid scalar value (not a surrogate, at most `U+10FFFF`).
pub fn parse_unicode(value: &str) -> Result<u32, ConfigError> {
    let trimmed = value.trim();
    let parsed = if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .or_else(|| trimmed.strip_prefix("U+"))
        .or_else(|| trimmed.strip_prefix("u+"))
    {
        u32::from_str_radix(hex, 16)
    } else {
        trimmed.parse::<u32>()
    };

    let code_point = parsed.map_err(|e| {
        ConfigError::Validation(format!("unicode: cannot parse '{value}' as a code point: {e}"))
    })?;

    if char::from_u32(code_point).is_none() {
        return Err(ConfigError::Validation(format!(
            "unicode: '{value}' is not a valid unicode scalar value"
        )));
    }
    Ok(code_point)
}
