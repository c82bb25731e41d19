//! Helper functions for settings operations.

use std::path::Path;

use crate::core::config::data::Config;

use super::error::SettingError;

/// Wrapper around `Config::mutate_at` that maps errors to `SettingError::ConfigError`.
pub fn mutate_config<F>(config_path: &Path, f: F) -> Result<(), SettingError>
where
    F: FnOnce(&mut Config),
{
    Config::mutate_at(config_path, f).map_err(|e| SettingError::ConfigError(e.to_string()))
}

/// Parse a boolean value from user input.
///
/// Accepts: on/off, true/false, yes/no (case-insensitive).
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Format a boolean value for display.
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

pub fn success_set(key: &str, value: &str) -> String {
    format!("✅ Set {key} to: {value}")
}

pub fn success_unset(key: &str, default: &str) -> String {
    format!("✅ Unset {key} (will use default: {default})")
}
