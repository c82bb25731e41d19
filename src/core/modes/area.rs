//! Staged expand/shrink edits of an area.
//!
//! Cells are collected in a staged set while the user walks the map cursor.
//! Nothing touches the area until [`AreaPainter::confirm`].

use std::collections::BTreeSet;

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use tracing::error;

use super::{
    is_letter, unmodified, wrap_next_index, wrap_previous_index, ModalController, ModeContext,
    ModeKind,
};
use crate::core::announce::{count_noun, report_host_error};
use crate::core::host::{AreaId, AreaRef, AreaStore, Cell, HostError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintMode {
    Expand,
    Shrink,
}

impl PaintMode {
    fn verb(self) -> &'static str {
        match self {
            PaintMode::Expand => "Expanding",
            PaintMode::Shrink => "Shrinking",
        }
    }

    fn past(self) -> &'static str {
        match self {
            PaintMode::Expand => "Expanded",
            PaintMode::Shrink => "Shrank",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            PaintMode::Expand => "Expansion",
            PaintMode::Shrink => "Shrinking",
        }
    }
}

#[derive(Debug)]
pub struct AreaPainter {
    target: Option<AreaRef>,
    mode: PaintMode,
    staged: BTreeSet<Cell>,
    review_index: Option<usize>,
}

impl Default for AreaPainter {
    fn default() -> Self {
        Self::new()
    }
}

impl AreaPainter {
    pub fn new() -> Self {
        Self {
            target: None,
            mode: PaintMode::Expand,
            staged: BTreeSet::new(),
            review_index: None,
        }
    }

    pub fn target(&self) -> Option<&AreaRef> {
        self.target.as_ref()
    }

    pub fn mode(&self) -> PaintMode {
        self.mode
    }

    pub fn staged(&self) -> &BTreeSet<Cell> {
        &self.staged
    }

    pub fn enter_expand(&mut self, area: AreaRef, ctx: &mut ModeContext<'_>) -> bool {
        self.enter(area, PaintMode::Expand, ctx)
    }

    pub fn enter_shrink(&mut self, area: AreaRef, ctx: &mut ModeContext<'_>) -> bool {
        self.enter(area, PaintMode::Shrink, ctx)
    }

    fn enter(&mut self, area: AreaRef, mode: PaintMode, ctx: &mut ModeContext<'_>) -> bool {
        if !ctx.host.in_game() {
            ctx.speech.say("No map loaded");
            return false;
        }

        ctx.speech.say(format!(
            "{} {}. Space stages the cell under the cursor, Enter applies, Escape cancels.",
            mode.verb(),
            area.label
        ));
        self.target = Some(area);
        self.mode = mode;
        self.staged.clear();
        self.review_index = None;
        true
    }

    /// Adds or removes the cursor cell from the staged set.
    pub fn toggle_stage_cell(&mut self, ctx: &mut ModeContext<'_>) {
        if self.target.is_none() {
            return;
        }

        let cursor = match ctx.host.cursor() {
            Ok(cursor) => cursor,
            Err(err) => {
                report_host_error(ctx.speech, "stage cell", &err);
                return;
            }
        };
        let position = cursor.position();
        if !position.valid || !cursor.in_bounds(position.cell) {
            ctx.speech.say("Cursor is outside the map");
            return;
        }

        let cell = position.cell;
        let verb = if self.staged.remove(&cell) {
            "Unstaged"
        } else {
            self.staged.insert(cell);
            "Staged"
        };
        self.review_index = None;
        ctx.speech.say(format!(
            "{verb} {cell}. {} staged",
            count_noun(self.staged.len(), "cell", "cells")
        ));
    }

    pub fn select_next_staged(&mut self, ctx: &mut ModeContext<'_>) {
        let next = match self.review_index {
            Some(current) => wrap_next_index(current, self.staged.len()),
            None => (!self.staged.is_empty()).then_some(0),
        };
        self.review(next, ctx);
    }

    pub fn select_previous_staged(&mut self, ctx: &mut ModeContext<'_>) {
        let previous = match self.review_index {
            Some(current) => wrap_previous_index(current, self.staged.len()),
            None => self.staged.len().checked_sub(1),
        };
        self.review(previous, ctx);
    }

    fn review(&mut self, index: Option<usize>, ctx: &mut ModeContext<'_>) {
        self.review_index = index;
        let Some(index) = index else {
            ctx.speech.say("No cells staged");
            return;
        };
        if let Some(cell) = self.staged.iter().nth(index) {
            ctx.speech
                .say(format!("{}/{}: {cell}", index + 1, self.staged.len()));
        }
    }

    pub fn read_staged_count(&self, ctx: &mut ModeContext<'_>) {
        if self.target.is_none() {
            return;
        }
        ctx.speech.say(format!(
            "{} staged",
            count_noun(self.staged.len(), "cell", "cells")
        ));
    }

    /// Writes every cell or none. Reads happen before the first write, and a
    /// failed write rolls back the cells already changed.
    fn apply(
        areas: &mut dyn AreaStore,
        area: AreaId,
        cells: &[Cell],
        member: bool,
    ) -> Result<(usize, usize), HostError> {
        let mut pending = Vec::with_capacity(cells.len());
        for &cell in cells {
            if areas.contains(area, cell)? != member {
                pending.push(cell);
            }
        }

        for (written, &cell) in pending.iter().enumerate() {
            if let Err(err) = areas.set(area, cell, member) {
                for &done in &pending[..written] {
                    if let Err(undo) = areas.set(area, done, !member) {
                        error!(error = %undo, cell = %done, "failed to roll back area edit");
                    }
                }
                return Err(err);
            }
        }
        Ok((pending.len(), areas.cell_count(area)?))
    }
}

impl ModalController for AreaPainter {
    fn kind(&self) -> ModeKind {
        ModeKind::AreaPainting
    }

    fn is_active(&self) -> bool {
        self.target.is_some()
    }

    fn confirm(&mut self, ctx: &mut ModeContext<'_>) {
        let Some(target) = self.target.clone() else {
            return;
        };

        if self.staged.is_empty() {
            ctx.speech.say(format!("No changes to {}", target.label));
            self.exit();
            return;
        }

        // Cells that fell off the map since staging are skipped.
        let cells: Vec<Cell> = match ctx.host.cursor() {
            Ok(cursor) => self
                .staged
                .iter()
                .copied()
                .filter(|cell| cursor.in_bounds(*cell))
                .collect(),
            Err(err) => {
                report_host_error(ctx.speech, "apply area edit", &err);
                return;
            }
        };

        let member = self.mode == PaintMode::Expand;
        let outcome = ctx
            .host
            .areas()
            .and_then(|areas| Self::apply(areas, target.id, &cells, member));

        match outcome {
            Ok((changed, total)) => {
                ctx.speech.say(format!(
                    "{} {} by {}. {} total",
                    self.mode.past(),
                    target.label,
                    count_noun(changed, "cell", "cells"),
                    count_noun(total, "cell", "cells"),
                ));
                self.exit();
            }
            Err(err) => report_host_error(ctx.speech, "apply area edit", &err),
        }
    }

    fn cancel(&mut self, ctx: &mut ModeContext<'_>) {
        if let Some(target) = self.target.as_ref() {
            ctx.speech.say(format!(
                "{} of {} cancelled",
                self.mode.noun(),
                target.label
            ));
        }
        self.exit();
    }

    fn exit(&mut self) {
        self.target = None;
        self.staged.clear();
        self.review_index = None;
    }

    fn handle_input(&mut self, key: &KeyEvent, ctx: &mut ModeContext<'_>) -> bool {
        if !self.is_active() {
            return false;
        }
        let Some(code) = unmodified(key) else {
            return false;
        };

        match code {
            KeyCode::Char(' ') => self.toggle_stage_cell(ctx),
            KeyCode::Enter => self.confirm(ctx),
            KeyCode::Esc => self.cancel(ctx),
            KeyCode::Char(']') => self.select_next_staged(ctx),
            KeyCode::Char('[') => self.select_previous_staged(ctx),
            code if is_letter(code, 'c') => self.read_staged_count(ctx),
            // Arrow keys belong to the host cursor.
            _ => return false,
        }
        true
    }
}
