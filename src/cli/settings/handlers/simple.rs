//! Single-value setting handlers: fixed choices and numbers.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{mutate_config, success_set, success_unset};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::config::data::Config;
use crate::core::modes::coordinator::OverlapPolicy;
use crate::core::speech::{ChannelOptions, Priority};

/// Data-driven handler for settings restricted to a fixed set of words.
pub struct ChoiceHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    accepted: &'static [&'static str],
    default_display: &'static str,
    get: fn(&Config) -> Option<&'static str>,
    /// Stores the parsed choice, or clears it with `None`. Returns false when
    /// the input is not a valid choice.
    apply: fn(&mut Config, Option<&str>) -> bool,
}

impl SettingHandler for ChoiceHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        }

        let input = args.join(" ");
        let normalized = input.trim().to_ascii_lowercase();
        // Validate against a scratch copy before touching the file.
        let mut probe = ctx.config.clone();
        if !(self.apply)(&mut probe, Some(&normalized)) {
            return Err(SettingError::InvalidChoice {
                key: self.key,
                input,
                accepted: self.accepted,
            });
        }

        let apply = self.apply;
        let message = success_set(self.key, &normalized);
        mutate_config(ctx.config_path, move |config| {
            apply(config, Some(&normalized));
        })?;
        Ok(message)
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        let apply = self.apply;
        mutate_config(ctx.config_path, move |config| {
            apply(config, None);
        })?;
        Ok(success_unset(self.key, self.default_display))
    }

    fn format(&self, config: &Config) -> String {
        match (self.get)(config) {
            Some(value) => format!("  {}: {}", self.key, value),
            None => format!("  {}: (unset, default: {})", self.key, self.default_display),
        }
    }
}

/// Create a handler for the `overlap-policy` setting.
pub fn overlap_policy_handler() -> ChoiceHandler {
    ChoiceHandler {
        key: "overlap-policy",
        hint: "To choose what happens when a mode opens over another, specify reject or replace:",
        example: "murmur set overlap-policy replace",
        accepted: &["reject", "replace"],
        default_display: "reject",
        get: |c| c.overlap_policy.map(OverlapPolicy::as_str),
        apply: |c, input| match input {
            None => {
                c.overlap_policy = None;
                true
            }
            Some(input) => match OverlapPolicy::parse(input) {
                Some(policy) => {
                    c.overlap_policy = Some(policy);
                    true
                }
                None => false,
            },
        },
    }
}

/// Create a handler for the `min-priority` setting.
pub fn min_priority_handler() -> ChoiceHandler {
    ChoiceHandler {
        key: "min-priority",
        hint: "To drop quieter announcements, specify the lowest priority to keep:",
        example: "murmur set min-priority normal",
        accepted: &["low", "normal", "high"],
        default_display: "low",
        get: |c| c.min_priority.map(Priority::as_str),
        apply: |c, input| match input {
            None => {
                c.min_priority = None;
                true
            }
            Some(input) => match Priority::parse(input) {
                Some(priority) => {
                    c.min_priority = Some(priority);
                    true
                }
                None => false,
            },
        },
    }
}

/// Handler for the `history-size` setting.
pub struct HistorySizeHandler;

impl SettingHandler for HistorySizeHandler {
    fn key(&self) -> &'static str {
        "history-size"
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        let Some(input) = args.first() else {
            return Err(SettingError::MissingArgs {
                hint: "To set how many announcements are remembered, specify a number:",
                example: "murmur set history-size 100",
            });
        };

        let size: usize = input
            .trim()
            .parse()
            .map_err(|_| SettingError::InvalidNumber {
                key: "history-size",
                input: input.clone(),
            })?;

        mutate_config(ctx.config_path, move |config| {
            config.history_size = Some(size);
        })?;
        Ok(success_set("history-size", &size.to_string()))
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        mutate_config(ctx.config_path, |config| config.history_size = None)?;
        Ok(success_unset(
            "history-size",
            &ChannelOptions::default().history_size.to_string(),
        ))
    }

    fn format(&self, config: &Config) -> String {
        match config.history_size {
            Some(size) => format!("  history-size: {size}"),
            None => format!(
                "  history-size: (unset, default: {})",
                ChannelOptions::default().history_size
            ),
        }
    }
}
