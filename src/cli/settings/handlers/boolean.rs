//! Boolean setting handlers for on/off settings.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{format_bool, mutate_config, parse_bool};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::config::data::Config;

/// Data-driven handler for boolean (on/off) settings.
pub struct BooleanHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default_display: &'static str,
    get: fn(&Config) -> Option<bool>,
    set_field: fn(&mut Config, Option<bool>),
}

impl SettingHandler for BooleanHandler {
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
        let value = parse_bool(&input).ok_or(SettingError::InvalidBoolean(input))?;
        let display = format_bool(value);
        let set_field = self.set_field;
        let key = self.key;

        mutate_config(ctx.config_path, move |config| set_field(config, Some(value)))?;

        Ok(format!("✅ Set {key} to: {display}"))
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        let set_field = self.set_field;

        mutate_config(ctx.config_path, move |config| set_field(config, None))?;

        Ok(format!(
            "✅ Unset {} (will use default: {})",
            self.key, self.default_display
        ))
    }

    fn format(&self, config: &Config) -> String {
        match (self.get)(config) {
            Some(value) => format!("  {}: {}", self.key, format_bool(value)),
            None => format!("  {}: (unset, default: {})", self.key, self.default_display),
        }
    }
}

/// Create a handler for the `direct-fallback` setting.
pub fn direct_fallback_handler() -> BooleanHandler {
    BooleanHandler {
        key: "direct-fallback",
        hint: "To allow or forbid the direct screen reader channel, specify on or off:",
        example: "murmur set direct-fallback off",
        default_display: "on",
        get: |c| c.direct_fallback,
        set_field: |c, v| c.direct_fallback = v,
    }
}
