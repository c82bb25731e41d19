use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::modes::coordinator::OverlapPolicy;
use crate::core::speech::{ChannelOptions, Priority};

/// Filter used when neither `RUST_LOG` nor `log_filter` is set.
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// What happens when a mode is requested while another one is open
    pub overlap_policy: Option<OverlapPolicy>,
    /// Announcements below this priority are dropped
    pub min_priority: Option<Priority>,
    /// Number of spoken lines kept for repeating
    pub history_size: Option<usize>,
    /// Allow switching to a running screen reader's direct channel
    pub direct_fallback: Option<bool>,
    /// `tracing_subscriber::EnvFilter` directives
    pub log_filter: Option<String>,
    /// File receiving a timestamped copy of every announcement
    pub transcript: Option<String>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/murmur/config.toml` → `~/.config/murmur/config.toml`
/// - Windows: `C:\\Users\\user\\AppData\\Roaming\\murmur\\config\\config.toml` is shown unchanged
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

impl Config {
    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.overlap_policy.unwrap_or_default()
    }

    pub fn channel_options(&self) -> ChannelOptions {
        let defaults = ChannelOptions::default();
        ChannelOptions {
            min_priority: self.min_priority.unwrap_or(defaults.min_priority),
            history_size: self.history_size.unwrap_or(defaults.history_size),
            direct_fallback: self.direct_fallback.unwrap_or(defaults.direct_fallback),
        }
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}
