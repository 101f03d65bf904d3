//! Default value functions for configuration.
//!
//! Each `default_*`-style free function here is referenced from a
//! `#[serde(default = "crate::defaults::...")]` attribute on a `Config` field.

use crate::types::{Case, FontFormat, LogLevel};

/// File name looked up in the project root when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "icon-font.yaml";

pub fn name() -> String {
    "icon-font".to_string()
}

pub fn source_dir() -> String {
    "assets/icon-font".to_string()
}

pub fn public_dir() -> String {
    "public".to_string()
}

pub fn target_dir() -> String {
    "icon-font".to_string()
}

pub fn build_dir() -> String {
    ".icon-font".to_string()
}

pub fn base64() -> bool {
    true
}

pub fn formats() -> Vec<FontFormat> {
    // Modern browsers only need these two
    vec![FontFormat::Woff2, FontFormat::Woff]
}

pub fn unicode() -> String {
    "0xe900".to_string()
}

pub fn case() -> Case {
    Case::Kebab
}

pub fn debounce_delay_ms() -> u64 {
    100
}

pub fn log_level() -> LogLevel {
    LogLevel::Info
}
