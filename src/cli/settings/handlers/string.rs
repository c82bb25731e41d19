//! String setting handlers for text-based settings.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{mutate_config, success_set, success_unset};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::config::data::{path_display, Config, DEFAULT_LOG_FILTER};

/// Handler for the `log-filter` setting.
pub struct LogFilterHandler;

impl SettingHandler for LogFilterHandler {
    fn key(&self) -> &'static str {
        "log-filter"
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To set the diagnostic log filter, provide tracing directives:",
                example: "murmur set log-filter murmur=debug",
            });
        }

        let value = args.join(",");
        let message = success_set("log-filter", &value);

        mutate_config(ctx.config_path, move |config| {
            config.log_filter = Some(value);
        })?;
        Ok(message)
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        mutate_config(ctx.config_path, |config| config.log_filter = None)?;
        Ok(success_unset("log-filter", DEFAULT_LOG_FILTER))
    }

    fn format(&self, config: &Config) -> String {
        match &config.log_filter {
            Some(filter) => format!("  log-filter: {filter}"),
            None => format!("  log-filter: (unset, default: {DEFAULT_LOG_FILTER})"),
        }
    }
}

/// Handler for the `transcript` setting.
pub struct TranscriptHandler;

impl SettingHandler for TranscriptHandler {
    fn key(&self) -> &'static str {
        "transcript"
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To keep a transcript of every announcement, provide a file path:",
                example: "murmur set transcript ~/murmur-transcript.log",
            });
        }

        let value = args.join(" ");
        let message = success_set("transcript", &path_display(&value));

        mutate_config(ctx.config_path, move |config| {
            config.transcript = Some(value);
        })?;
        Ok(message)
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        mutate_config(ctx.config_path, |config| config.transcript = None)?;
        Ok("✅ Unset transcript (announcements are no longer written to a file)".to_string())
    }

    fn format(&self, config: &Config) -> String {
        match &config.transcript {
            Some(path) => format!("  transcript: {}", path_display(path)),
            None => "  transcript: (unset, default: off)".to_string(),
        }
    }
}
