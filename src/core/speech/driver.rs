//! Screen-reader driver boundary.
//!
//! The channel only ever talks to these two traits. Real bindings (a screen
//! reader abstraction library, or the direct controller client of a single
//! reader) live outside this crate; the console and null drivers here back the
//! demo and the tests.

use std::error::Error as StdError;
use std::fmt;
use std::io::{self, Write};

/// Errors reported by a speech driver or a direct reader channel.
#[derive(Debug)]
pub enum DriverError {
    /// The driver library could not be loaded or initialised.
    Load(String),
    /// The driver accepted the call but failed to deliver the utterance.
    Speak(String),
    /// Writing to the underlying sink failed.
    Io(io::Error),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Load(reason) => write!(f, "speech driver failed to load: {reason}"),
            DriverError::Speak(reason) => write!(f, "speech driver failed to speak: {reason}"),
            DriverError::Io(err) => write!(f, "speech driver I/O error: {err}"),
        }
    }
}

impl StdError for DriverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DriverError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for DriverError {
    fn from(err: io::Error) -> Self {
        DriverError::Io(err)
    }
}

/// Primary screen-reader abstraction.
pub trait SpeechDriver {
    fn initialize(&mut self) -> Result<(), DriverError>;

    fn shutdown(&mut self);

    /// Whether the driver is loaded and attached to some output.
    fn is_active(&self) -> bool;

    /// True when the driver could not find a screen reader and fell back to
    /// the generic operating-system speech API.
    fn is_generic_fallback(&self) -> bool {
        false
    }

    fn speak(&mut self, text: &str, interrupt: bool) -> Result<(), DriverError>;
}

/// Direct control channel of one specific screen reader, used when the
/// primary driver has downgraded to generic speech while that reader runs.
pub trait DirectReader {
    fn is_running(&self) -> bool;

    fn speak_text(&mut self, text: &str) -> Result<(), DriverError>;
}

/// Driver that is never active. Every speak is refused.
#[derive(Debug, Default)]
pub struct NullDriver;

impl SpeechDriver for NullDriver {
    fn initialize(&mut self) -> Result<(), DriverError> {
        Err(DriverError::Load("no screen reader driver configured".into()))
    }

    fn shutdown(&mut self) {}

    fn is_active(&self) -> bool {
        false
    }

    fn speak(&mut self, _text: &str, _interrupt: bool) -> Result<(), DriverError> {
        Err(DriverError::Speak("driver inactive".into()))
    }
}

/// Writes each utterance on its own line after a one-character marker: `!`
/// when it interrupts, a space otherwise.
pub struct ConsoleDriver<W: Write> {
    out: W,
    active: bool,
}

impl ConsoleDriver<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleDriver<W> {
    pub fn new(out: W) -> Self {
        Self { out, active: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SpeechDriver for ConsoleDriver<W> {
    fn initialize(&mut self) -> Result<(), DriverError> {
        self.active = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        let _ = self.out.flush();
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn speak(&mut self, text: &str, interrupt: bool) -> Result<(), DriverError> {
        let marker = if interrupt { "!" } else { " " };
        // Raw terminal mode needs an explicit carriage return.
        write!(self.out, "{marker} {text}\r\n")?;
        self.out.flush()?;
        Ok(())
    }
}
