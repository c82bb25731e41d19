//! Text helpers shared by the mode announcements.

use tracing::error;
use unicode_segmentation::UnicodeSegmentation;

use crate::core::host::HostError;
use crate::core::speech::{Priority, SpeechChannel};

pub const ELLIPSIS: &str = "...";

/// Flattens host-provided text into a single spoken line.
///
/// Drops rich-text markup tags, replaces newlines and other control
/// characters with spaces, and collapses runs of whitespace.
pub fn sanitize(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c if c.is_control() => plain.push(' '),
            c => plain.push(c),
        }
    }
    plain.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cuts `text` to at most `max` user-perceived characters, marking the cut.
pub fn truncate(text: &str, max: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max {
        return text.to_string();
    }
    let mut cut = graphemes[..max].concat();
    cut.truncate(cut.trim_end().len());
    cut.push_str(ELLIPSIS);
    cut
}

/// Joins the non-empty parts with ". ".
pub fn join_sentences<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .filter_map(|part| {
            let trimmed = part.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect::<Vec<_>>()
        .join(". ")
}

pub fn count_noun(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}

pub fn on_off(state: bool) -> &'static str {
    if state {
        "ON"
    } else {
        "OFF"
    }
}

/// Logs a host integration failure and narrates it.
pub fn report_host_error(speech: &mut SpeechChannel, operation: &str, err: &HostError) {
    error!(operation, error = %err, "host adapter call failed");
    speech.speak(err.narration(), Priority::Normal);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::Capability;

    #[test]
    fn sanitize_strips_markup_and_newlines() {
        assert_eq!(
            sanitize("<color=#ff0000>Hauls</color> things\n\nto   stockpiles"),
            "Hauls things to stockpiles"
        );
        assert_eq!(sanitize("a\tb\r\nc"), "a b c");
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly", 7), "exactly");
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("abcdefgh", 4), "abcd...");
        assert_eq!(truncate("ab cdefgh", 3), "ab...");
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn join_sentences_skips_blank_parts() {
        assert_eq!(
            join_sentences(["Core", "", "  ", "version 1.5"]),
            "Core. version 1.5"
        );
        assert_eq!(join_sentences(Vec::<String>::new()), "");
    }

    #[test]
    fn count_noun_pluralizes() {
        assert_eq!(count_noun(1, "cell", "cells"), "1 cell");
        assert_eq!(count_noun(0, "cell", "cells"), "0 cells");
        assert_eq!(count_noun(4, "cell", "cells"), "4 cells");
    }

    #[test]
    fn host_errors_are_narrated() {
        let mut speech = SpeechChannel::silent();
        let err = HostError::unavailable(Capability::ModRegistry, "field renamed");
        report_host_error(&mut speech, "open mod list", &err);
        assert_eq!(speech.last_text(), Some("Mod list is unavailable"));
    }
}
