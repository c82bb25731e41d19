//! Settings management for CLI set/unset commands.
//!
//! Each configuration key has a handler; handler types cover the setting
//! patterns:
//!
//! - Choice settings (`overlap-policy`, `min-priority`)
//! - Number settings (`history-size`)
//! - Boolean settings (`direct-fallback`)
//! - Free text settings (`log-filter`, `transcript`)

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod registry;

use std::path::Path;

pub use error::SettingError;
pub use registry::SettingRegistry;

use crate::core::config::data::Config;

/// Context provided to setting handlers during set/unset operations.
pub struct SetContext<'a> {
    /// Snapshot of the configuration before the change.
    pub config: &'a Config,
    /// File the change is written to.
    pub config_path: &'a Path,
}

/// Trait for handling a configuration setting.
///
/// Each implementation handles a specific configuration key,
/// providing set, unset, and format operations.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Set the configuration value.
    ///
    /// # Arguments
    /// * `args` - The arguments provided after the key (may be empty)
    /// * `ctx` - Context containing the config snapshot and its path
    ///
    /// # Returns
    /// A success message to display, or an error.
    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError>;

    /// Unset (clear) the configuration value so the default applies again.
    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError>;

    /// Format the current value for display in `murmur set` output.
    fn format(&self, config: &Config) -> String;
}

/// Runs `murmur set`. With no key, prints every setting.
pub fn run_set(
    registry: &SettingRegistry,
    key: Option<&str>,
    args: &[String],
    config_path: &Path,
) -> Result<String, SettingError> {
    let config = Config::load_from_path(config_path)
        .map_err(|err| SettingError::ConfigError(err.to_string()))?;

    let Some(key) = key else {
        let mut lines = vec!["Available settings:".to_string()];
        lines.extend(
            registry
                .keys_display_order()
                .iter()
                .filter_map(|key| registry.get(key))
                .map(|handler| handler.format(&config)),
        );
        return Ok(lines.join("\n"));
    };

    let handler = registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;
    let mut ctx = SetContext {
        config: &config,
        config_path,
    };
    handler.set(args, &mut ctx)
}

/// Runs `murmur unset <key>`.
pub fn run_unset(
    registry: &SettingRegistry,
    key: &str,
    config_path: &Path,
) -> Result<String, SettingError> {
    let config = Config::load_from_path(config_path)
        .map_err(|err| SettingError::ConfigError(err.to_string()))?;
    let handler = registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;
    let mut ctx = SetContext {
        config: &config,
        config_path,
    };
    handler.unset(&mut ctx)
}
