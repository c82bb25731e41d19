//! Error types for settings operations.

use std::fmt;

/// Errors that can occur when modifying configuration settings.
#[derive(Debug)]
pub enum SettingError {
    /// The provided setting key is not recognized.
    UnknownKey(String),
    /// The provided value is not one of the accepted choices.
    InvalidChoice {
        key: &'static str,
        input: String,
        accepted: &'static [&'static str],
    },
    /// The provided value could not be parsed as a whole number.
    InvalidNumber { key: &'static str, input: String },
    /// The provided value could not be parsed as a boolean.
    InvalidBoolean(String),
    /// Required arguments are missing.
    MissingArgs {
        hint: &'static str,
        example: &'static str,
    },
    /// An error occurred while loading or persisting the configuration.
    ConfigError(String),
}

impl SettingError {
    /// Print the error message to stderr with appropriate formatting.
    pub fn print(&self) {
        match self {
            SettingError::UnknownKey(key) => {
                eprintln!("❌ Unknown config key: {key}");
                eprintln!("   Run 'murmur set' to list available settings.");
            }
            SettingError::InvalidChoice {
                key,
                input,
                accepted,
            } => {
                eprintln!("❌ Invalid value for {key}: {input}");
                eprintln!("   Use one of: {}", accepted.join(", "));
            }
            SettingError::InvalidNumber { key, input } => {
                eprintln!("❌ Invalid value for {key}: {input}");
                eprintln!("   Use a whole number, for example 50");
            }
            SettingError::InvalidBoolean(input) => {
                eprintln!("❌ Invalid boolean value: {input}");
                eprintln!("   Use 'on' or 'off' (also accepts true/false, yes/no)");
            }
            SettingError::MissingArgs { hint, example } => {
                eprintln!("⚠️  {hint}");
                eprintln!("Example: {example}");
            }
            SettingError::ConfigError(msg) => {
                eprintln!("❌ Failed to update configuration: {msg}");
            }
        }
    }

    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SettingError::MissingArgs { .. } => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(f, "Unknown config key: {key}"),
            SettingError::InvalidChoice { key, input, .. } => {
                write!(f, "Invalid value for {key}: {input}")
            }
            SettingError::InvalidNumber { key, input } => {
                write!(f, "Invalid value for {key}: {input}")
            }
            SettingError::InvalidBoolean(input) => write!(f, "Invalid boolean value: {input}"),
            SettingError::MissingArgs { hint, .. } => write!(f, "{hint}"),
            SettingError::ConfigError(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for SettingError {}
