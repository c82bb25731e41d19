//! Terminal demo: the narrator driven by real or scripted key presses against
//! the in-memory sample colony.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{debug, info, warn};

use crate::core::app::Narrator;
use crate::core::config::Config;
use crate::core::host::memory::{MemoryHost, HOME_AREA};
use crate::core::host::AreaRef;
use crate::core::modes::ModeKind;
use crate::core::speech::{ConsoleDriver, Priority, SpeechChannel};
use crate::utils::logging::LoggingState;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpecError(pub String);

impl fmt::Display for KeySpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized key '{}'", self.0)
    }
}

impl Error for KeySpecError {}

/// Parses one key such as `m`, `Down`, `Ctrl+S` or `Shift+G`.
pub fn parse_key(spec: &str) -> Result<KeyEvent, KeySpecError> {
    let spec = spec.trim();
    let err = || KeySpecError(spec.to_string());
    let mut parts: Vec<&str> = spec.split('+').map(str::trim).collect();
    // A trailing empty part means the key itself was '+'.
    if parts.len() > 1 && parts.last() == Some(&"") {
        parts.pop();
        if let Some(last) = parts.last_mut() {
            *last = "+";
        }
    }
    let (name, modifier_names) = parts.split_last().ok_or_else(err)?;

    let mut modifiers = KeyModifiers::NONE;
    for modifier in modifier_names {
        modifiers |= match modifier.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "alt" => KeyModifiers::ALT,
            "shift" => KeyModifiers::SHIFT,
            _ => return Err(err()),
        };
    }

    let mut chars = name.chars();
    let code = match (chars.next(), chars.next()) {
        (Some(c), None) => {
            if modifiers.contains(KeyModifiers::SHIFT) {
                KeyCode::Char(c.to_ascii_uppercase())
            } else {
                if c.is_ascii_uppercase() {
                    modifiers |= KeyModifiers::SHIFT;
                }
                KeyCode::Char(c)
            }
        }
        _ => match name.to_ascii_lowercase().as_str() {
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            "tab" => KeyCode::Tab,
            "space" => KeyCode::Char(' '),
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            other => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                Some(n) if (1..=12).contains(&n) => KeyCode::F(n),
                _ => return Err(err()),
            },
        },
    };
    Ok(KeyEvent::new(code, modifiers))
}

/// Parses a comma-separated key script. Empty entries are skipped.
pub fn parse_key_list(list: &str) -> Result<Vec<KeyEvent>, KeySpecError> {
    list.split(',')
        .filter(|spec| !spec.trim().is_empty())
        .map(parse_key)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn home() -> AreaRef {
    AreaRef {
        id: HOME_AREA,
        label: "Home".to_string(),
    }
}

/// Feeds one key to the narrator, then to the demo host shortcuts.
pub fn dispatch(narrator: &mut Narrator<MemoryHost>, key: &KeyEvent) -> Flow {
    if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
        return Flow::Quit;
    }
    if narrator.handle_key(key) {
        return Flow::Continue;
    }

    // Keys left over go to the host, as they would in the game.
    match key.code {
        KeyCode::Esc if narrator.active_mode() == Some(ModeKind::Dialog) => {
            narrator.host_mut().dialog.current = None;
        }
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
            let (dx, dz) = match key.code {
                KeyCode::Up => (0, 1),
                KeyCode::Down => (0, -1),
                KeyCode::Left => (-1, 0),
                _ => (1, 0),
            };
            let cell = narrator.host_mut().map.move_cursor_by(dx, dz);
            narrator.speech_mut().speak(cell.to_string(), Priority::Low);
        }
        _ if narrator.active_mode().is_some() => {}
        KeyCode::Char('x') => {
            narrator.expand_area(home());
        }
        KeyCode::Char('X') => {
            narrator.shrink_area(home());
        }
        KeyCode::Char('d') => narrator.host_mut().dialog.start_sample(),
        KeyCode::Char('q') => return Flow::Quit,
        other => debug!(?other, "key not bound"),
    }
    Flow::Continue
}

/// Runs the demo, replaying `keys` when given and reading the terminal otherwise.
pub fn run_demo(
    config: &Config,
    keys: Option<&str>,
    log: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let script = keys.map(parse_key_list).transpose()?;

    let mut speech = SpeechChannel::new(Box::new(ConsoleDriver::stdout()), config.channel_options());
    if let Some(path) = log.or_else(|| config.transcript.clone()) {
        speech = speech.with_transcript(LoggingState::new(Some(path))?);
    }
    let mut narrator = Narrator::new(MemoryHost::sample(), speech, config.overlap_policy())?;
    narrator.start();
    narrator.frame();

    let result = match script {
        Some(script) => {
            info!(keys = script.len(), "replaying key script");
            for key in &script {
                if dispatch(&mut narrator, key) == Flow::Quit {
                    break;
                }
                narrator.frame();
            }
            Ok(())
        }
        None => run_interactive(&mut narrator),
    };

    narrator.shutdown();
    result
}

fn run_interactive(narrator: &mut Narrator<MemoryHost>) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let result = interactive_loop(narrator);
    if let Err(err) = disable_raw_mode() {
        warn!(error = %err, "failed to restore terminal mode");
    }
    result
}

fn interactive_loop(narrator: &mut Narrator<MemoryHost>) -> Result<(), Box<dyn Error>> {
    loop {
        narrator.frame();
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if dispatch(narrator, &key) == Flow::Quit {
            return Ok(());
        }
    }
}
