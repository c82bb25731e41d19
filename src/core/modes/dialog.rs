//! Option browsing for host dialog trees.
//!
//! The host decides which node is on screen; this controller only follows it
//! from the render callback. It never wraps: the first and last options are
//! hard stops so the user can tell where the list ends.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use super::{is_letter, unmodified, ModalController, ModeContext, ModeKind};
use crate::core::announce::{report_host_error, sanitize};
use crate::core::host::{DialogNode, DialogOption};

#[derive(Debug, Default)]
pub struct OptionBrowser {
    node: Option<DialogNode>,
    index: usize,
    /// Body text of the current node was already read out.
    narrated: bool,
}

fn describe_option(option: &DialogOption) -> String {
    let text = sanitize(&option.text);
    if !option.disabled {
        return text;
    }
    let reason = option
        .disabled_reason
        .as_deref()
        .map(sanitize)
        .filter(|reason| !reason.is_empty())
        .unwrap_or_else(|| "disabled".to_string());
    format!("{text} ({reason})")
}

impl OptionBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self) -> Option<&DialogNode> {
        self.node.as_ref()
    }

    pub fn selected_index(&self) -> usize {
        self.index
    }

    /// Called once per rendered frame while the host shows `node`.
    pub fn on_frame(&mut self, node: DialogNode, ctx: &mut ModeContext<'_>) {
        let is_new = self.node.as_ref().map(|current| current.id) != Some(node.id);
        if is_new {
            debug!(node = node.id.0, options = node.options.len(), "dialog node shown");
            self.index = 0;
            self.narrated = false;
        } else {
            self.index = self.index.min(node.options.len().saturating_sub(1));
        }
        self.node = Some(node);

        if !self.narrated {
            self.narrated = true;
            self.read_body(ctx);
            self.announce_selected(ctx);
        }
    }

    pub fn read_body(&self, ctx: &mut ModeContext<'_>) {
        if let Some(node) = &self.node {
            ctx.speech.say(sanitize(&node.text));
        }
    }

    fn option_count(&self) -> usize {
        self.node.as_ref().map_or(0, |node| node.options.len())
    }

    fn selected(&self) -> Option<&DialogOption> {
        self.node.as_ref()?.options.get(self.index)
    }

    fn announce_selected(&self, ctx: &mut ModeContext<'_>) {
        match self.selected() {
            Some(option) => ctx.speech.say(describe_option(option)),
            None if self.node.is_some() => ctx.speech.say("No options"),
            None => {}
        }
    }

    pub fn select_next(&mut self, ctx: &mut ModeContext<'_>) {
        let count = self.option_count();
        if self.index + 1 < count {
            self.index += 1;
        }
        self.announce_selected(ctx);
    }

    pub fn select_previous(&mut self, ctx: &mut ModeContext<'_>) {
        self.index = self.index.saturating_sub(1);
        self.announce_selected(ctx);
    }

    /// Chooses the selected option. The host swaps in the follow-up node on a
    /// later frame.
    pub fn activate_selected(&mut self, ctx: &mut ModeContext<'_>) {
        let Some(option) = self.selected().cloned() else {
            return;
        };
        if option.disabled {
            ctx.speech.say(format!("Unavailable: {}", describe_option(&option)));
            return;
        }

        let index = self.index;
        match ctx.host.dialog().and_then(|dialog| dialog.activate(index)) {
            Ok(()) => {
                debug!(index, "dialog option chosen");
                self.narrated = false;
            }
            Err(err) => report_host_error(ctx.speech, "choose dialog option", &err),
        }
    }
}

impl ModalController for OptionBrowser {
    fn kind(&self) -> ModeKind {
        ModeKind::Dialog
    }

    fn is_active(&self) -> bool {
        self.node.is_some()
    }

    fn confirm(&mut self, ctx: &mut ModeContext<'_>) {
        self.activate_selected(ctx);
    }

    /// The host owns the dialog window, so cancelling only stops following it.
    fn cancel(&mut self, _ctx: &mut ModeContext<'_>) {
        self.exit();
    }

    fn exit(&mut self) {
        self.node = None;
        self.index = 0;
        self.narrated = false;
    }

    fn handle_input(&mut self, key: &KeyEvent, ctx: &mut ModeContext<'_>) -> bool {
        if !self.is_active() {
            return false;
        }
        let Some(code) = unmodified(key) else {
            return false;
        };

        match code {
            KeyCode::Down => self.select_next(ctx),
            KeyCode::Up => self.select_previous(ctx),
            KeyCode::Enter => self.activate_selected(ctx),
            code if is_letter(code, 'r') => self.read_body(ctx),
            _ => return false,
        }
        true
    }
}
