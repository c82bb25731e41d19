//! Narration sink shared by every mode.
//!
//! All announcements go through [`SpeechChannel::speak`]. The channel owns the
//! interruption policy (only [`Priority::High`] preempts), the verbosity floor,
//! a short history for repeating the last line, and the fallback to a direct
//! reader channel. Driver failures never reach the caller: they are logged and
//! the utterance is dropped.

pub mod driver;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::utils::logging::LoggingState;
pub use driver::{ConsoleDriver, DirectReader, DriverError, NullDriver, SpeechDriver};

/// Interruption hint attached to every announcement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "normal" => Some(Priority::Normal),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    fn interrupts(self) -> bool {
        self == Priority::High
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub priority: Priority,
}

#[derive(Debug, Clone)]
pub struct ChannelOptions {
    /// Requests below this priority are dropped.
    pub min_priority: Priority,
    pub history_size: usize,
    /// Allow switching to the direct reader channel.
    pub direct_fallback: bool,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            min_priority: Priority::Low,
            history_size: 50,
            direct_fallback: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverState {
    Uninitialized,
    Ready,
    Unavailable,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPath {
    Primary,
    Direct,
}

pub struct SpeechChannel {
    driver: Box<dyn SpeechDriver>,
    direct: Option<Box<dyn DirectReader>>,
    state: DriverState,
    path: OutputPath,
    options: ChannelOptions,
    history: VecDeque<SpeechRequest>,
    transcript: Option<LoggingState>,
}

impl SpeechChannel {
    pub fn new(driver: Box<dyn SpeechDriver>, options: ChannelOptions) -> Self {
        Self {
            driver,
            direct: None,
            state: DriverState::Uninitialized,
            path: OutputPath::Primary,
            options,
            history: VecDeque::new(),
            transcript: None,
        }
    }

    /// Channel with no driver. Speaks are recorded in history only.
    pub fn silent() -> Self {
        Self::new(Box::new(NullDriver), ChannelOptions::default())
    }

    pub fn with_direct_reader(mut self, reader: Box<dyn DirectReader>) -> Self {
        self.direct = Some(reader);
        self
    }

    pub fn with_transcript(mut self, transcript: LoggingState) -> Self {
        self.transcript = Some(transcript);
        self
    }

    /// Loads the driver. Repeated calls after the first attempt do nothing.
    pub fn initialize(&mut self) -> bool {
        if self.state != DriverState::Uninitialized {
            return self.state == DriverState::Ready;
        }

        match self.driver.initialize() {
            Ok(()) => {
                debug!("speech driver initialised");
                self.state = DriverState::Ready;
                true
            }
            Err(err) => {
                warn!(error = %err, "speech driver unavailable; narration disabled");
                self.state = DriverState::Unavailable;
                false
            }
        }
    }

    pub fn shutdown(&mut self) {
        if self.state == DriverState::Ready {
            self.driver.shutdown();
        }
        self.state = DriverState::Shutdown;
    }

    pub fn is_available(&self) -> bool {
        self.state == DriverState::Ready && self.driver.is_active()
    }

    pub fn output_path(&self) -> OutputPath {
        self.path
    }

    pub fn speak(&mut self, text: impl Into<String>, priority: Priority) {
        let text = text.into();
        if text.trim().is_empty() {
            return;
        }
        if priority < self.options.min_priority {
            debug!(priority = priority.as_str(), "announcement below verbosity floor");
            return;
        }

        let request = SpeechRequest { text, priority };
        self.emit(&request);
        self.remember(request);
    }

    pub fn say(&mut self, text: impl Into<String>) {
        self.speak(text, Priority::Normal);
    }

    pub fn urgent(&mut self, text: impl Into<String>) {
        self.speak(text, Priority::High);
    }

    /// Re-speaks the most recent announcement, interrupting current speech.
    pub fn repeat_last(&mut self) -> bool {
        let Some(last) = self.history.back().cloned() else {
            return false;
        };
        let request = SpeechRequest {
            text: last.text,
            priority: Priority::High,
        };
        self.emit(&request);
        true
    }

    pub fn history(&self) -> impl Iterator<Item = &SpeechRequest> {
        self.history.iter()
    }

    pub fn last(&self) -> Option<&SpeechRequest> {
        self.history.back()
    }

    pub fn last_text(&self) -> Option<&str> {
        self.last().map(|request| request.text.as_str())
    }

    pub fn transcript_mut(&mut self) -> Option<&mut LoggingState> {
        self.transcript.as_mut()
    }

    fn remember(&mut self, request: SpeechRequest) {
        if self.options.history_size == 0 {
            return;
        }
        if self.history.len() == self.options.history_size {
            self.history.pop_front();
        }
        self.history.push_back(request);
    }

    fn emit(&mut self, request: &SpeechRequest) {
        if let Some(transcript) = self.transcript.as_ref() {
            if let Err(err) = transcript.log_announcement(request) {
                warn!(error = %err, "failed to write transcript line");
            }
        }

        if self.state == DriverState::Uninitialized {
            self.initialize();
        }
        if self.state != DriverState::Ready {
            return;
        }

        self.maybe_switch_to_direct();

        if self.path == OutputPath::Direct {
            if let Some(direct) = self.direct.as_mut() {
                match direct.speak_text(&request.text) {
                    Ok(()) => return,
                    Err(err) => {
                        warn!(error = %err, "direct reader failed; using primary driver for this call");
                    }
                }
            }
        }

        if !self.driver.is_active() {
            return;
        }
        if let Err(err) = self
            .driver
            .speak(&request.text, request.priority.interrupts())
        {
            warn!(error = %err, "speech driver failed; announcement dropped");
        }
    }

    fn maybe_switch_to_direct(&mut self) {
        if self.path == OutputPath::Direct || !self.options.direct_fallback {
            return;
        }
        let Some(direct) = self.direct.as_ref() else {
            return;
        };
        if self.driver.is_generic_fallback() && direct.is_running() {
            debug!("primary driver fell back to generic speech; switching to direct reader");
            self.path = OutputPath::Direct;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{RecordingDriver, RecordingReader, SpokenLog};

    fn channel_with(driver: RecordingDriver) -> SpeechChannel {
        SpeechChannel::new(Box::new(driver), ChannelOptions::default())
    }

    #[test]
    fn empty_and_blank_text_is_dropped() {
        let log = SpokenLog::default();
        let mut channel = channel_with(RecordingDriver::new(log.clone()));
        channel.say("");
        channel.say("   ");
        assert!(log.lines().is_empty());
        assert!(channel.last().is_none());
    }

    #[test]
    fn only_high_priority_interrupts() {
        let log = SpokenLog::default();
        let mut channel = channel_with(RecordingDriver::new(log.clone()));
        channel.speak("low", Priority::Low);
        channel.say("normal");
        channel.urgent("high");
        assert_eq!(
            log.lines(),
            vec![
                ("primary", "low".to_string(), false),
                ("primary", "normal".to_string(), false),
                ("primary", "high".to_string(), true),
            ]
        );
    }

    #[test]
    fn initialize_is_idempotent() {
        let log = SpokenLog::default();
        let driver = RecordingDriver::new(log.clone());
        let init_count = driver.init_count();
        let mut channel = channel_with(driver);
        assert!(channel.initialize());
        assert!(channel.initialize());
        channel.say("hello");
        assert_eq!(init_count.get(), 1);
    }

    #[test]
    fn unavailable_driver_is_a_silent_no_op() {
        let mut channel = SpeechChannel::silent();
        channel.say("nobody hears this");
        assert!(!channel.is_available());
        assert_eq!(channel.last_text(), Some("nobody hears this"));
    }

    #[test]
    fn failing_driver_does_not_propagate() {
        let log = SpokenLog::default();
        let mut channel = channel_with(RecordingDriver::failing(log.clone()));
        channel.urgent("still fine");
        assert!(log.lines().is_empty());
        assert_eq!(channel.last_text(), Some("still fine"));
    }

    #[test]
    fn verbosity_floor_drops_quiet_requests() {
        let log = SpokenLog::default();
        let options = ChannelOptions {
            min_priority: Priority::Normal,
            ..ChannelOptions::default()
        };
        let mut channel = SpeechChannel::new(Box::new(RecordingDriver::new(log.clone())), options);
        channel.speak("chatter", Priority::Low);
        channel.say("kept");
        assert_eq!(log.texts(), vec!["kept".to_string()]);
    }

    #[test]
    fn switches_to_direct_reader_when_primary_downgrades() {
        let log = SpokenLog::default();
        let driver = RecordingDriver::new(log.clone()).generic_fallback();
        let mut channel = channel_with(driver)
            .with_direct_reader(Box::new(RecordingReader::running(log.clone())));

        channel.say("first");
        channel.say("second");

        assert_eq!(channel.output_path(), OutputPath::Direct);
        assert_eq!(
            log.lines(),
            vec![
                ("direct", "first".to_string(), false),
                ("direct", "second".to_string(), false),
            ]
        );
    }

    #[test]
    fn stays_on_primary_when_reader_not_running() {
        let log = SpokenLog::default();
        let driver = RecordingDriver::new(log.clone()).generic_fallback();
        let mut channel = channel_with(driver)
            .with_direct_reader(Box::new(RecordingReader::stopped(log.clone())));
        channel.say("hello");
        assert_eq!(channel.output_path(), OutputPath::Primary);
        assert_eq!(log.lines()[0].0, "primary");
    }

    #[test]
    fn direct_failure_reverts_to_primary_for_that_call() {
        let log = SpokenLog::default();
        let driver = RecordingDriver::new(log.clone()).generic_fallback();
        let mut channel = channel_with(driver)
            .with_direct_reader(Box::new(RecordingReader::broken(log.clone())));

        channel.urgent("rescued");

        assert_eq!(channel.output_path(), OutputPath::Direct);
        assert_eq!(log.lines(), vec![("primary", "rescued".to_string(), true)]);
    }

    #[test]
    fn repeat_last_reinterrupts_with_previous_text() {
        let log = SpokenLog::default();
        let mut channel = channel_with(RecordingDriver::new(log.clone()));
        assert!(!channel.repeat_last());
        channel.say("Stockpile zone, 12 cells");
        assert!(channel.repeat_last());
        assert_eq!(
            log.lines().last().cloned(),
            Some(("primary", "Stockpile zone, 12 cells".to_string(), true))
        );
        assert_eq!(channel.history().count(), 1);
    }

    #[test]
    fn history_is_bounded() {
        let options = ChannelOptions {
            history_size: 2,
            ..ChannelOptions::default()
        };
        let mut channel = SpeechChannel::new(Box::new(NullDriver), options);
        channel.say("one");
        channel.say("two");
        channel.say("three");
        let texts: Vec<&str> = channel.history().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
    }

    #[test]
    fn shutdown_silences_channel() {
        let log = SpokenLog::default();
        let mut channel = channel_with(RecordingDriver::new(log.clone()));
        channel.initialize();
        channel.shutdown();
        channel.say("after shutdown");
        assert!(log.lines().is_empty());
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!(Priority::parse("HIGH"), Some(Priority::High));
        assert_eq!(Priority::parse(" low "), Some(Priority::Low));
        assert_eq!(Priority::parse("loud"), None);
        assert!(Priority::Low < Priority::Normal && Priority::Normal < Priority::High);
    }
}
