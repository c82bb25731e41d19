use crate::core::config::data::{Config, DEFAULT_LOG_FILTER};
use crate::core::speech::ChannelOptions;

impl Config {
    /// Lines describing every key, marking the ones left at their default.
    pub fn summary_lines(&self) -> Vec<String> {
        let defaults = ChannelOptions::default();
        let mut lines = vec!["Current configuration:".to_string()];

        let mut push = |key: &str, value: Option<String>, default: String| {
            lines.push(match value {
                Some(value) => format!("  {key}: {value}"),
                None => format!("  {key}: (unset, default: {default})"),
            });
        };
        push(
            "overlap-policy",
            self.overlap_policy.map(|p| p.as_str().to_string()),
            self.overlap_policy().as_str().to_string(),
        );
        push(
            "min-priority",
            self.min_priority.map(|p| p.as_str().to_string()),
            defaults.min_priority.as_str().to_string(),
        );
        push(
            "history-size",
            self.history_size.map(|n| n.to_string()),
            defaults.history_size.to_string(),
        );
        push(
            "direct-fallback",
            self.direct_fallback.map(|b| if b { "on" } else { "off" }.to_string()),
            if defaults.direct_fallback { "on" } else { "off" }.to_string(),
        );
        push(
            "log-filter",
            self.log_filter.clone(),
            DEFAULT_LOG_FILTER.to_string(),
        );
        push("transcript", self.transcript.clone(), "off".to_string());
        lines
    }

    pub fn print_all(&self) {
        for line in self.summary_lines() {
            println!("{line}");
        }
    }
}
