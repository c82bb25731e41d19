use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::core::host::memory::HOME_AREA;
use crate::core::host::{AreaId, AreaRef};
use crate::core::speech::{DirectReader, DriverError, SpeechDriver};

pub const HOME: AreaId = HOME_AREA;

pub fn home_area() -> AreaRef {
    AreaRef {
        id: HOME,
        label: "Home".to_string(),
    }
}

/// Shared record of everything the test drivers were asked to speak.
#[derive(Debug, Clone, Default)]
pub struct SpokenLog {
    lines: Rc<RefCell<Vec<(&'static str, String, bool)>>>,
}

impl SpokenLog {
    fn push(&self, source: &'static str, text: &str, interrupt: bool) {
        self.lines
            .borrow_mut()
            .push((source, text.to_string(), interrupt));
    }

    /// `(source, text, interrupt)` per spoken line, source being "primary"
    /// or "direct".
    pub fn lines(&self) -> Vec<(&'static str, String, bool)> {
        self.lines.borrow().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .map(|(_, text, _)| text.clone())
            .collect()
    }
}

pub struct RecordingDriver {
    log: SpokenLog,
    active: bool,
    fail_speak: bool,
    generic: bool,
    init_count: Rc<Cell<usize>>,
}

impl RecordingDriver {
    pub fn new(log: SpokenLog) -> Self {
        Self {
            log,
            active: false,
            fail_speak: false,
            generic: false,
            init_count: Rc::new(Cell::new(0)),
        }
    }

    /// Loads fine but every speak fails.
    pub fn failing(log: SpokenLog) -> Self {
        Self {
            fail_speak: true,
            ..Self::new(log)
        }
    }

    /// Reports itself as the platform's generic fallback voice.
    pub fn generic_fallback(mut self) -> Self {
        self.generic = true;
        self
    }

    pub fn init_count(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.init_count)
    }
}

impl SpeechDriver for RecordingDriver {
    fn initialize(&mut self) -> Result<(), DriverError> {
        self.init_count.set(self.init_count.get() + 1);
        self.active = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_generic_fallback(&self) -> bool {
        self.generic
    }

    fn speak(&mut self, text: &str, interrupt: bool) -> Result<(), DriverError> {
        if self.fail_speak {
            return Err(DriverError::Speak("device lost".to_string()));
        }
        self.log.push("primary", text, interrupt);
        Ok(())
    }
}

pub struct RecordingReader {
    log: SpokenLog,
    running: bool,
    broken: bool,
}

impl RecordingReader {
    pub fn running(log: SpokenLog) -> Self {
        Self {
            log,
            running: true,
            broken: false,
        }
    }

    pub fn stopped(log: SpokenLog) -> Self {
        Self {
            running: false,
            ..Self::running(log)
        }
    }

    /// Claims to be running but rejects every line.
    pub fn broken(log: SpokenLog) -> Self {
        Self {
            broken: true,
            ..Self::running(log)
        }
    }
}

impl DirectReader for RecordingReader {
    fn is_running(&self) -> bool {
        self.running
    }

    fn speak_text(&mut self, text: &str) -> Result<(), DriverError> {
        if self.broken {
            return Err(DriverError::Speak("reader pipe closed".to_string()));
        }
        self.log.push("direct", text, false);
        Ok(())
    }
}
