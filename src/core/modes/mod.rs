//! Exclusive keyboard interaction modes.
//!
//! Every mode is a two-state machine (inactive, active) implementing
//! [`ModalController`]. Entry points are mode specific and live on each
//! controller; the [`coordinator::ModeCoordinator`] guarantees that at most one
//! controller is active and routes key presses to it.

pub mod area;
pub mod commands;
pub mod coordinator;
pub mod dialog;
pub mod mod_list;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::host::Host;
use crate::core::speech::SpeechChannel;

/// Borrowed collaborators handed to every controller call.
pub struct ModeContext<'a> {
    pub host: &'a mut dyn Host,
    pub speech: &'a mut SpeechChannel,
}

impl<'a> ModeContext<'a> {
    pub fn new(host: &'a mut dyn Host, speech: &'a mut SpeechChannel) -> Self {
        Self { host, speech }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    AreaPainting,
    Commands,
    ModList,
    Dialog,
}

impl ModeKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ModeKind::AreaPainting => "area editing",
            ModeKind::Commands => "command menu",
            ModeKind::ModList => "mod list",
            ModeKind::Dialog => "dialog",
        }
    }
}

/// Lifecycle shared by all modes.
pub trait ModalController {
    fn kind(&self) -> ModeKind;

    fn is_active(&self) -> bool;

    /// Commits whatever the mode staged, announces a summary and exits.
    fn confirm(&mut self, ctx: &mut ModeContext<'_>);

    /// Discards staged state and exits, announcing the cancellation when the
    /// mode had a target.
    fn cancel(&mut self, ctx: &mut ModeContext<'_>);

    /// Drops all session state without narration.
    fn exit(&mut self);

    /// Returns true when the key was consumed.
    fn handle_input(&mut self, key: &KeyEvent, ctx: &mut ModeContext<'_>) -> bool;
}

/// Utility function to wrap to previous index in a circular manner
pub fn wrap_previous_index(current: usize, total: usize) -> Option<usize> {
    if total == 0 {
        None
    } else if current == 0 || current >= total {
        Some(total - 1)
    } else {
        Some(current - 1)
    }
}

/// Utility function to wrap to next index in a circular manner
pub fn wrap_next_index(current: usize, total: usize) -> Option<usize> {
    if total == 0 {
        None
    } else {
        Some((current + 1) % total)
    }
}

/// Key code when no modifier other than Shift is held.
pub(crate) fn unmodified(key: &KeyEvent) -> Option<KeyCode> {
    let extra = key.modifiers.difference(KeyModifiers::SHIFT);
    extra.is_empty().then_some(key.code)
}

pub(crate) fn with_ctrl(key: &KeyEvent) -> Option<KeyCode> {
    (key.modifiers == KeyModifiers::CONTROL).then_some(key.code)
}

pub(crate) fn is_letter(code: KeyCode, letter: char) -> bool {
    matches!(code, KeyCode::Char(c) if c.eq_ignore_ascii_case(&letter))
}
