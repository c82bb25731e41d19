//! Owner of the four controllers and the single-active-mode rule.

use std::error::Error as StdError;
use std::fmt;

use ratatui::crossterm::event::KeyEvent;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::area::AreaPainter;
use super::commands::CommandBrowser;
use super::dialog::OptionBrowser;
use super::mod_list::ModListBrowser;
use super::{ModalController, ModeContext, ModeKind};
use crate::core::announce::report_host_error;
use crate::core::host::AreaRef;

/// What happens when a mode is requested while another one is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Refuse the new mode and say which one is open.
    #[default]
    Reject,
    /// Cancel the open mode, then enter the new one.
    Replace,
}

impl OverlapPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            OverlapPolicy::Reject => "reject",
            OverlapPolicy::Replace => "replace",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "reject" => Some(OverlapPolicy::Reject),
            "replace" => Some(OverlapPolicy::Replace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeError {
    Busy {
        active: ModeKind,
        requested: ModeKind,
    },
}

impl fmt::Display for ModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeError::Busy { active, requested } => write!(
                f,
                "cannot open the {} while the {} is open",
                requested.display_name(),
                active.display_name()
            ),
        }
    }
}

impl StdError for ModeError {}

#[derive(Debug, Default)]
pub struct ModeCoordinator {
    policy: OverlapPolicy,
    area: AreaPainter,
    commands: CommandBrowser,
    mod_list: ModListBrowser,
    dialog: OptionBrowser,
}

impl ModeCoordinator {
    pub fn new(policy: OverlapPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: OverlapPolicy) {
        self.policy = policy;
    }

    pub fn area(&self) -> &AreaPainter {
        &self.area
    }

    pub fn commands(&self) -> &CommandBrowser {
        &self.commands
    }

    pub fn mod_list(&self) -> &ModListBrowser {
        &self.mod_list
    }

    pub fn dialog(&self) -> &OptionBrowser {
        &self.dialog
    }

    fn controllers(&self) -> [&dyn ModalController; 4] {
        [&self.area, &self.commands, &self.mod_list, &self.dialog]
    }

    fn controller_mut(&mut self, kind: ModeKind) -> &mut dyn ModalController {
        match kind {
            ModeKind::AreaPainting => &mut self.area,
            ModeKind::Commands => &mut self.commands,
            ModeKind::ModList => &mut self.mod_list,
            ModeKind::Dialog => &mut self.dialog,
        }
    }

    /// The open mode, if any. At most one controller is ever active.
    pub fn active(&self) -> Option<ModeKind> {
        let mut open = self
            .controllers()
            .into_iter()
            .filter(|controller| controller.is_active())
            .map(|controller| controller.kind());
        let active = open.next();
        debug_assert!(open.next().is_none(), "two modes active at once");
        active
    }

    /// Clears the way for `requested` according to the overlap policy.
    fn make_room(
        &mut self,
        requested: ModeKind,
        ctx: &mut ModeContext<'_>,
    ) -> Result<(), ModeError> {
        let Some(active) = self.active() else {
            return Ok(());
        };
        if active == requested {
            return Ok(());
        }

        match self.policy {
            OverlapPolicy::Reject => {
                debug!(?active, ?requested, "mode request rejected");
                ctx.speech
                    .say(format!("Close the {} first", active.display_name()));
                Err(ModeError::Busy { active, requested })
            }
            OverlapPolicy::Replace => {
                debug!(?active, ?requested, "replacing open mode");
                self.force_close(ctx);
                Ok(())
            }
        }
    }

    pub fn enter_expand(
        &mut self,
        area: AreaRef,
        ctx: &mut ModeContext<'_>,
    ) -> Result<bool, ModeError> {
        self.make_room(ModeKind::AreaPainting, ctx)?;
        Ok(self.area.enter_expand(area, ctx))
    }

    pub fn enter_shrink(
        &mut self,
        area: AreaRef,
        ctx: &mut ModeContext<'_>,
    ) -> Result<bool, ModeError> {
        self.make_room(ModeKind::AreaPainting, ctx)?;
        Ok(self.area.enter_shrink(area, ctx))
    }

    pub fn open_commands(&mut self, ctx: &mut ModeContext<'_>) -> Result<bool, ModeError> {
        self.make_room(ModeKind::Commands, ctx)?;
        Ok(self.commands.open(ctx))
    }

    pub fn open_commands_at_cursor(
        &mut self,
        ctx: &mut ModeContext<'_>,
    ) -> Result<bool, ModeError> {
        self.make_room(ModeKind::Commands, ctx)?;
        Ok(self.commands.open_at_cursor(ctx))
    }

    pub fn open_mod_list(&mut self, ctx: &mut ModeContext<'_>) -> Result<bool, ModeError> {
        self.make_room(ModeKind::ModList, ctx)?;
        Ok(self.mod_list.open(ctx))
    }

    /// Render callback. Follows the host dialog: a node on screen takes focus
    /// whatever the policy (the host window is modal), and a vanished node
    /// closes the dialog mode.
    pub fn on_frame(&mut self, ctx: &mut ModeContext<'_>) {
        let node = match ctx.host.dialog() {
            Ok(dialog) => dialog.current_node(),
            Err(err) => {
                if self.dialog.is_active() {
                    report_host_error(ctx.speech, "follow dialog", &err);
                    self.dialog.exit();
                }
                return;
            }
        };

        match node {
            Some(node) => {
                if let Some(active) = self.active().filter(|kind| *kind != ModeKind::Dialog) {
                    debug!(?active, "host dialog preempts open mode");
                    self.force_close(ctx);
                }
                self.dialog.on_frame(node, ctx);
            }
            None => {
                if self.dialog.is_active() {
                    self.force_close(ctx);
                }
            }
        }
    }

    /// Routes a key press to the open mode. Returns true when it was consumed.
    pub fn handle_input(&mut self, key: &KeyEvent, ctx: &mut ModeContext<'_>) -> bool {
        match self.active() {
            Some(kind) => self.controller_mut(kind).handle_input(key, ctx),
            None => false,
        }
    }

    /// Closes the open mode with the same cleanup as a user cancel.
    pub fn force_close(&mut self, ctx: &mut ModeContext<'_>) {
        if let Some(kind) = self.active() {
            debug!(?kind, "closing mode");
            self.controller_mut(kind).cancel(ctx);
        }
    }
}
