//! Environment variable allowlist and substitution for config file processing.
//!
//! Only allowlisted variables (and `ICON_FONT_*` prefixed ones) are resolved so
//! that a config file copied from elsewhere cannot pull arbitrary environment
//! values into generated paths or compiler command lines.

use regex::Regex;
use std::sync::LazyLock;

/// Matches `${NAME}` and `${NAME:-default}`, optionally escaped by a
/// leading `$`.
static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<escape>\$)?\$\{(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?::-(?P<default>(?:[^}\\]|\\.)*))?\}")
        .expect("env-var substitution regex is a compile-time constant and must be valid")
});

/// Environment variables that are safe to substitute in config files.
pub const ALLOWED_ENV_VARS: &[&str] = &[
    "HOME",
    "USER",
    "USERNAME",
    "USERPROFILE",
    "PWD",
    "TMPDIR",
    "TEMP",
    "TMP",
    "XDG_CACHE_HOME",
    "XDG_DATA_HOME",
    "APPDATA",
    "LOCALAPPDATA",
];

/// A variable is allowed if it appears in [`ALLOWED_ENV_VARS`] or starts with
/// `ICON_FONT_`.
pub fn is_env_var_allowed(var_name: &str) -> bool {
    ALLOWED_ENV_VARS.contains(&var_name) || var_name.starts_with("ICON_FONT_")
}

/// Substitute `${VAR}` patterns in a string with environment variable values.
///
/// - `${VAR}` is replaced with the value of `VAR`; unset variables stay as-is.
/// - `${VAR:-default}` falls back to `default` when `VAR` is unset.
/// - `$${VAR}` is an escape producing the literal `${VAR}`.
/// - Non-allowlisted variables are left untouched and a warning is logged.
pub fn substitute_variables(input: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(input, |caps: &regex::Captures| {
            let whole = &caps[0];
            if caps.name("escape").is_some() {
                return whole[1..].to_string();
            }
            resolve(&caps["name"], caps.name("default").map(|m| m.as_str()))
                .unwrap_or_else(|| whole.to_string())
        })
        .into_owned()
}

/// Value for one `${name}` reference, or `None` to leave it untouched.
fn resolve(name: &str, default: Option<&str>) -> Option<String> {
    if !is_env_var_allowed(name) {
        log::warn!(
            "Config references non-allowlisted environment variable ${{{name}}}; left unexpanded"
        );
        return None;
    }
    std::env::var(name)
        .ok()
        .or_else(|| default.map(|value| value.replace("\\}", "}")))
}
