//! Linear browsing and execution of command buttons ("gizmos").
//!
//! The list is a snapshot taken when the browser opens, either from the
//! current selection or from whatever stands under the map cursor. Executing a
//! command always ends the session, except for disabled commands which only
//! explain why they cannot run.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use super::{
    unmodified, wrap_next_index, wrap_previous_index, ModalController, ModeContext, ModeKind,
};
use crate::core::announce::{count_noun, on_off, report_host_error, sanitize};
use crate::core::host::{Cell, CommandSource, Gizmo, GizmoKind, HostError};

pub const DISABLED_FALLBACK: &str = "not available";

/// Where the commands were collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOrigin {
    Selection,
    Cursor(Cell),
}

#[derive(Debug, Default)]
pub struct CommandBrowser {
    gizmos: Vec<Gizmo>,
    index: usize,
    origin: Option<CommandOrigin>,
}

impl CommandBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gizmos(&self) -> &[Gizmo] {
        &self.gizmos
    }

    pub fn selected_index(&self) -> usize {
        self.index
    }

    pub fn origin(&self) -> Option<CommandOrigin> {
        self.origin
    }

    /// Opens the browser on the commands of every selected thing.
    pub fn open(&mut self, ctx: &mut ModeContext<'_>) -> bool {
        if !ctx.host.in_game() {
            ctx.speech.say("Not in a game");
            return false;
        }

        let collected = ctx
            .host
            .commands()
            .and_then(|commands| commands.selection_gizmos());
        match collected {
            Ok(gizmos) => self.activate(gizmos, CommandOrigin::Selection, ctx),
            Err(err) => {
                report_host_error(ctx.speech, "collect commands", &err);
                false
            }
        }
    }

    /// Opens the browser on the commands of the things under the cursor.
    pub fn open_at_cursor(&mut self, ctx: &mut ModeContext<'_>) -> bool {
        if !ctx.host.in_game() {
            ctx.speech.say("Not in a game");
            return false;
        }

        let cell = match ctx.host.cursor() {
            Ok(cursor) => {
                let position = cursor.position();
                if !position.valid || !cursor.in_bounds(position.cell) {
                    ctx.speech.say("Cursor is outside the map");
                    return false;
                }
                position.cell
            }
            Err(err) => {
                report_host_error(ctx.speech, "read cursor", &err);
                return false;
            }
        };

        let collected = ctx
            .host
            .commands()
            .and_then(|commands| commands.gizmos_at(cell));
        match collected {
            Ok(gizmos) => self.activate(gizmos, CommandOrigin::Cursor(cell), ctx),
            Err(err) => {
                report_host_error(ctx.speech, "collect commands", &err);
                false
            }
        }
    }

    fn activate(
        &mut self,
        gizmos: Vec<Gizmo>,
        origin: CommandOrigin,
        ctx: &mut ModeContext<'_>,
    ) -> bool {
        let mut visible: Vec<Gizmo> = gizmos.into_iter().filter(|g| g.visible).collect();
        // sort_by is stable: equal orders keep collection order
        visible.sort_by(|a, b| a.order.total_cmp(&b.order));

        if visible.is_empty() {
            ctx.speech.say("No commands available");
            self.exit();
            return false;
        }

        debug!(count = visible.len(), ?origin, "command browser opened");
        self.gizmos = visible;
        self.index = 0;
        self.origin = Some(origin);
        ctx.speech.say(format!(
            "{}. {}",
            count_noun(self.gizmos.len(), "command", "commands"),
            self.describe_selected()
        ));
        true
    }

    /// `"{i}/{n}: {label}[: {description}][ ({hotkey})][ [DISABLED: {reason}]]"`
    pub fn describe(&self, index: usize) -> Option<String> {
        let gizmo = self.gizmos.get(index)?;
        let mut line = format!(
            "{}/{}: {}",
            index + 1,
            self.gizmos.len(),
            sanitize(&gizmo.label)
        );
        if let Some(description) = gizmo.description.as_deref().map(sanitize) {
            if !description.is_empty() {
                line.push_str(": ");
                line.push_str(&description);
            }
        }
        if let Some(hotkey) = gizmo.hotkey.as_deref().filter(|h| !h.is_empty()) {
            line.push_str(&format!(" ({hotkey})"));
        }
        if gizmo.disabled {
            line.push_str(&format!(" [DISABLED: {}]", disabled_reason(gizmo)));
        }
        Some(line)
    }

    fn describe_selected(&self) -> String {
        self.describe(self.index).unwrap_or_default()
    }

    fn announce_selected(&self, ctx: &mut ModeContext<'_>) {
        if let Some(line) = self.describe(self.index) {
            ctx.speech.say(line);
        }
    }

    pub fn select_next(&mut self, ctx: &mut ModeContext<'_>) {
        if let Some(next) = wrap_next_index(self.index, self.gizmos.len()) {
            self.index = next;
            self.announce_selected(ctx);
        }
    }

    pub fn select_previous(&mut self, ctx: &mut ModeContext<'_>) {
        if let Some(previous) = wrap_previous_index(self.index, self.gizmos.len()) {
            self.index = previous;
            self.announce_selected(ctx);
        }
    }

    pub fn select_first(&mut self, ctx: &mut ModeContext<'_>) {
        if !self.gizmos.is_empty() {
            self.index = 0;
            self.announce_selected(ctx);
        }
    }

    pub fn select_last(&mut self, ctx: &mut ModeContext<'_>) {
        if let Some(last) = self.gizmos.len().checked_sub(1) {
            self.index = last;
            self.announce_selected(ctx);
        }
    }

    /// Runs the selected command and closes the browser.
    pub fn execute_selected(&mut self, ctx: &mut ModeContext<'_>) {
        let Some(gizmo) = self.gizmos.get(self.index).cloned() else {
            return;
        };

        if gizmo.disabled {
            ctx.speech
                .say(format!("Disabled: {}", disabled_reason(&gizmo)));
            return;
        }

        let origin = self.origin.unwrap_or(CommandOrigin::Selection);
        let outcome = ctx
            .host
            .commands()
            .and_then(|commands| dispatch(commands, &gizmo, origin));

        match outcome {
            Ok(narration) => {
                debug!(label = %gizmo.label, "command executed");
                self.exit();
                if let Some(narration) = narration {
                    ctx.speech.say(narration);
                }
            }
            Err(err) => report_host_error(ctx.speech, "execute command", &err),
        }
    }
}

fn disabled_reason(gizmo: &Gizmo) -> String {
    gizmo
        .disabled_reason
        .as_deref()
        .map(sanitize)
        .filter(|reason| !reason.is_empty())
        .unwrap_or_else(|| DISABLED_FALLBACK.to_string())
}

/// Invokes `gizmo` according to its kind and returns what to announce.
fn dispatch(
    commands: &mut dyn CommandSource,
    gizmo: &Gizmo,
    origin: CommandOrigin,
) -> Result<Option<String>, HostError> {
    let label = sanitize(&gizmo.label);
    match &gizmo.kind {
        GizmoKind::Placement => {
            // The placement interaction reads the host selection for context.
            if let CommandOrigin::Cursor(cell) = origin {
                commands.select_at(cell)?;
            }
            commands.invoke(gizmo.id)?;
            Ok(Some(format!(
                "{label}: placement mode. Move the cursor to choose a spot, Enter to place, Escape to stop."
            )))
        }
        GizmoKind::Toggle => {
            commands.invoke(gizmo.id)?;
            let state = commands.toggle_state(gizmo.id)?;
            Ok(Some(format!("{label}: {}", on_off(state))))
        }
        GizmoKind::Targeted { actor, verb } => {
            commands.invoke(gizmo.id)?;
            Ok(Some(format!(
                "{} will {}. Move the cursor to a target and press Enter.",
                sanitize(actor),
                sanitize(verb)
            )))
        }
        GizmoKind::Plain => {
            commands.invoke(gizmo.id)?;
            Ok(None)
        }
    }
}

impl ModalController for CommandBrowser {
    fn kind(&self) -> ModeKind {
        ModeKind::Commands
    }

    fn is_active(&self) -> bool {
        self.origin.is_some()
    }

    fn confirm(&mut self, ctx: &mut ModeContext<'_>) {
        self.execute_selected(ctx);
    }

    fn cancel(&mut self, ctx: &mut ModeContext<'_>) {
        if self.is_active() {
            ctx.speech.say("Command menu closed");
        }
        self.exit();
    }

    fn exit(&mut self) {
        self.gizmos.clear();
        self.index = 0;
        self.origin = None;
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
            KeyCode::Home => self.select_first(ctx),
            KeyCode::End => self.select_last(ctx),
            KeyCode::Enter => self.execute_selected(ctx),
            KeyCode::Esc => self.cancel(ctx),
            _ => return false,
        }
        true
    }
}
