//! Two-column mod list browser.
//!
//! The host owns both columns and may filter them at any time, so every
//! operation re-reads the live column instead of caching it. The browser only
//! keeps the focused column and index, and mirrors every move into the host's
//! primary selection so the visual list follows the spoken one.

use std::collections::HashMap;

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use super::{
    is_letter, unmodified, with_ctrl, wrap_next_index, wrap_previous_index, ModalController,
    ModeContext, ModeKind,
};
use crate::core::announce::{join_sentences, report_host_error, sanitize, truncate};
use crate::core::host::{
    HostError, ModColumn, ModEntry, ModRegistry, ModSource, ReorderOutcome, ToggleOutcome,
};

/// Longest description `read_info` speaks before cutting it.
pub const DESCRIPTION_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

#[derive(Debug)]
pub struct ModListBrowser {
    active: bool,
    column: ModColumn,
    index: usize,
    /// Last focused entry key per column, restored when returning to it.
    remembered: HashMap<ModColumn, String>,
}

impl Default for ModListBrowser {
    fn default() -> Self {
        Self::new()
    }
}

fn with_mods<T>(
    ctx: &mut ModeContext<'_>,
    operation: &str,
    f: impl FnOnce(&mut dyn ModRegistry) -> Result<T, HostError>,
) -> Option<T> {
    match ctx.host.mods().and_then(f) {
        Ok(value) => Some(value),
        Err(err) => {
            report_host_error(ctx.speech, operation, &err);
            None
        }
    }
}

/// `"{name}, {i} of {n}, {enabled|disabled}[, version incompatible][, has errors]"`
pub fn describe_entry(entry: &ModEntry, index: usize, count: usize) -> String {
    let mut line = format!(
        "{}, {} of {}, {}",
        sanitize(&entry.name),
        index + 1,
        count,
        if entry.active { "enabled" } else { "disabled" }
    );
    if !entry.version_compatible {
        line.push_str(", version incompatible");
    }
    if entry.warning.is_some() {
        line.push_str(", has errors");
    }
    line
}

fn empty_message(column: ModColumn) -> String {
    format!("{} list is empty", column.label())
}

impl ModListBrowser {
    pub fn new() -> Self {
        Self {
            active: false,
            column: ModColumn::Active,
            index: 0,
            remembered: HashMap::new(),
        }
    }

    pub fn column(&self) -> ModColumn {
        self.column
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn open(&mut self, ctx: &mut ModeContext<'_>) -> bool {
        let seeded = with_mods(ctx, "open mod list", |mods| {
            let primary = mods.primary_selection();
            for column in [ModColumn::Active, ModColumn::Inactive] {
                let entries = mods.column(column)?;
                let found = primary
                    .as_ref()
                    .and_then(|key| entries.iter().position(|e| &e.key == key));
                if let Some(index) = found {
                    return Ok((column, index, entries));
                }
            }
            Ok((ModColumn::Active, 0, mods.column(ModColumn::Active)?))
        });
        let Some((column, index, entries)) = seeded else {
            return false;
        };

        self.active = true;
        self.remembered.clear();
        let line = self
            .focus(column, index, &entries, ctx)
            .unwrap_or_else(|| empty_message(column));
        ctx.speech.say(format!("Mod list. {line}"));
        true
    }

    fn live_column(&self, ctx: &mut ModeContext<'_>, column: ModColumn) -> Option<Vec<ModEntry>> {
        with_mods(ctx, "read mod list", |mods| mods.column(column))
    }

    /// The focused entry in the live column. The host filter can change the
    /// column under us, so focus follows the remembered key and otherwise
    /// clamps to the last listed entry.
    fn current_entry(&mut self, ctx: &mut ModeContext<'_>) -> Option<ModEntry> {
        let column = self.column;
        let entries = self.live_column(ctx, column)?;
        let Some(last) = entries.len().checked_sub(1) else {
            self.index = 0;
            ctx.speech.say(empty_message(column));
            return None;
        };

        let listed = self
            .remembered
            .get(&column)
            .and_then(|key| entries.iter().position(|e| &e.key == key));
        match listed {
            Some(index) => self.index = index,
            None => {
                self.focus(column, self.index.min(last), &entries, ctx);
            }
        }
        entries.get(self.index).cloned()
    }

    /// Moves focus and mirrors it into the host selection. Returns the line
    /// describing the focused entry.
    fn focus(
        &mut self,
        column: ModColumn,
        index: usize,
        entries: &[ModEntry],
        ctx: &mut ModeContext<'_>,
    ) -> Option<String> {
        self.column = column;
        self.index = index;
        let entry = entries.get(index)?;
        self.remembered.insert(column, entry.key.clone());
        with_mods(ctx, "select mod", |mods| {
            mods.set_primary_selection(&entry.key);
            Ok(())
        });
        Some(describe_entry(entry, index, entries.len()))
    }

    fn step(&mut self, ctx: &mut ModeContext<'_>, next: fn(usize, usize) -> Option<usize>) {
        let column = self.column;
        let Some(entries) = self.live_column(ctx, column) else {
            return;
        };
        match next(self.index, entries.len()) {
            Some(index) => {
                if let Some(line) = self.focus(column, index, &entries, ctx) {
                    ctx.speech.say(line);
                }
            }
            None => {
                self.index = 0;
                ctx.speech.say(empty_message(column));
            }
        }
    }

    pub fn select_next(&mut self, ctx: &mut ModeContext<'_>) {
        self.step(ctx, wrap_next_index);
    }

    pub fn select_previous(&mut self, ctx: &mut ModeContext<'_>) {
        self.step(ctx, wrap_previous_index);
    }

    pub fn select_first(&mut self, ctx: &mut ModeContext<'_>) {
        self.step(ctx, |_, count| (count > 0).then_some(0));
    }

    pub fn select_last(&mut self, ctx: &mut ModeContext<'_>) {
        self.step(ctx, |_, count| count.checked_sub(1));
    }

    pub fn switch_column(&mut self, ctx: &mut ModeContext<'_>) {
        let target = self.column.other();
        let Some(entries) = self.live_column(ctx, target) else {
            return;
        };

        let index = self
            .remembered
            .get(&target)
            .and_then(|key| entries.iter().position(|e| &e.key == key))
            .unwrap_or(0);
        match self.focus(target, index, &entries, ctx) {
            Some(line) => ctx.speech.say(format!("{}. {line}", target.label())),
            None => ctx.speech.say(empty_message(target)),
        }
    }

    /// Enables an inactive mod or disables an active one, then follows it to
    /// its new column.
    pub fn toggle_selected(&mut self, ctx: &mut ModeContext<'_>) {
        let Some(entry) = self.current_entry(ctx) else {
            return;
        };
        let enable = !entry.active;
        let name = sanitize(&entry.name);

        let Some(outcome) = with_mods(ctx, "toggle mod", |mods| {
            mods.set_enabled(&entry.key, enable)
        }) else {
            return;
        };

        if let ToggleOutcome::Conflict { other } = outcome {
            ctx.speech.urgent(format!(
                "Cannot enable {name}: package id {} is already used by {}",
                entry.package_id,
                sanitize(&other)
            ));
            return;
        }

        let verb = if enable { "enabled" } else { "disabled" };
        debug!(key = %entry.key, verb, "mod toggled");
        let target = self.column.other();
        let Some(entries) = self.live_column(ctx, target) else {
            return;
        };
        match entries.iter().position(|e| e.key == entry.key) {
            Some(index) => {
                if let Some(line) = self.focus(target, index, &entries, ctx) {
                    ctx.speech.say(format!("{name} {verb}. {line}"));
                }
            }
            None => {
                // Filtered out of its new column; stay put.
                let remaining = self.live_column(ctx, self.column).unwrap_or_default();
                self.index = self.index.min(remaining.len().saturating_sub(1));
                ctx.speech.say(format!("{name} {verb}"));
            }
        }
    }

    pub fn move_up(&mut self, ctx: &mut ModeContext<'_>) {
        self.reorder(Direction::Up, ctx);
    }

    pub fn move_down(&mut self, ctx: &mut ModeContext<'_>) {
        self.reorder(Direction::Down, ctx);
    }

    fn reorder(&mut self, direction: Direction, ctx: &mut ModeContext<'_>) {
        if self.column != ModColumn::Active {
            ctx.speech.say("Only active mods can be reordered");
            return;
        }
        let Some(entry) = self.current_entry(ctx) else {
            return;
        };
        let name = sanitize(&entry.name);

        let Some(order) = with_mods(ctx, "read load order", |mods| mods.load_order()) else {
            return;
        };
        // The filtered display index is not the load order position.
        let Some(from) = order.iter().position(|id| id == &entry.package_id) else {
            ctx.speech.say(format!("{name} is not in the load order"));
            return;
        };
        let to = match direction {
            Direction::Up if from == 0 => {
                ctx.speech.say(format!("{name} is already at the top"));
                return;
            }
            Direction::Up => from - 1,
            Direction::Down if from + 1 >= order.len() => {
                ctx.speech.say(format!("{name} is already at the bottom"));
                return;
            }
            Direction::Down => from + 1,
        };

        let Some(outcome) = with_mods(ctx, "reorder mods", |mods| mods.reorder(from, to)) else {
            return;
        };
        if let ReorderOutcome::Rejected { reason } = outcome {
            ctx.speech
                .urgent(format!("Cannot move {name}: {}", sanitize(&reason)));
            return;
        }

        let Some(entries) = self.live_column(ctx, ModColumn::Active) else {
            return;
        };
        if let Some(index) = entries.iter().position(|e| e.key == entry.key) {
            self.focus(ModColumn::Active, index, &entries, ctx);
        }
        ctx.speech.say(format!(
            "{name} moved to position {} of {} in load order",
            to + 1,
            order.len()
        ));
    }

    pub fn auto_sort(&mut self, ctx: &mut ModeContext<'_>) {
        if with_mods(ctx, "sort mods", |mods| mods.auto_sort()).is_none() {
            return;
        }
        let column = self.column;
        let Some(entries) = self.live_column(ctx, column) else {
            return;
        };
        let line = self
            .focus(column, 0, &entries, ctx)
            .unwrap_or_else(|| empty_message(column));
        ctx.speech.say(format!("Mods sorted. {line}"));
    }

    pub fn open_settings(&mut self, ctx: &mut ModeContext<'_>) {
        let Some(entry) = self.current_entry(ctx) else {
            return;
        };
        let name = sanitize(&entry.name);
        let has_settings = with_mods(ctx, "open mod settings", |mods| {
            Ok(mods.has_settings(&entry.key))
        });
        match has_settings {
            Some(false) => ctx.speech.say(format!("{name} has no settings")),
            Some(true) => {
                if with_mods(ctx, "open mod settings", |mods| mods.open_settings(&entry.key))
                    .is_some()
                {
                    ctx.speech.say(format!("Opened settings for {name}"));
                }
            }
            None => {}
        }
    }

    pub fn read_info(&mut self, ctx: &mut ModeContext<'_>) {
        let Some(entry) = self.current_entry(ctx) else {
            return;
        };
        let Some(details) = with_mods(ctx, "read mod info", |mods| mods.details(&entry.key))
        else {
            return;
        };

        let description = details
            .description
            .as_deref()
            .map(sanitize)
            .map(|text| truncate(&text, DESCRIPTION_LIMIT))
            .unwrap_or_default();
        let info = join_sentences([
            sanitize(&entry.name),
            details
                .author
                .map(|author| format!("by {}", sanitize(&author)))
                .unwrap_or_default(),
            details
                .version
                .map(|version| format!("version {version}"))
                .unwrap_or_default(),
            if entry.version_compatible {
                String::new()
            } else {
                "Not made for this game version".to_string()
            },
            entry.warning.as_deref().map(sanitize).unwrap_or_default(),
            description,
        ]);
        ctx.speech.say(info);
    }

    pub fn open_mod_folder(&mut self, ctx: &mut ModeContext<'_>) {
        let Some(entry) = self.current_entry(ctx) else {
            return;
        };
        if with_mods(ctx, "open mod folder", |mods| mods.open_folder(&entry.key)).is_some() {
            ctx.speech
                .say(format!("Opened folder of {}", sanitize(&entry.name)));
        }
    }

    pub fn open_workshop_page(&mut self, ctx: &mut ModeContext<'_>) {
        let Some(entry) = self.current_entry(ctx) else {
            return;
        };
        let name = sanitize(&entry.name);
        if entry.source != ModSource::Workshop {
            ctx.speech.say(format!("{name} is not from the Workshop"));
            return;
        }
        if with_mods(ctx, "open workshop page", |mods| {
            mods.open_workshop_page(&entry.key)
        })
        .is_some()
        {
            ctx.speech.say(format!("Opened Workshop page for {name}"));
        }
    }

    pub fn upload_to_workshop(&mut self, ctx: &mut ModeContext<'_>) {
        let Some(entry) = self.current_entry(ctx) else {
            return;
        };
        let name = sanitize(&entry.name);
        let Some((dev_mode, ready)) = with_mods(ctx, "upload mod", |mods| {
            Ok((mods.dev_mode(), mods.workshop_ready()))
        }) else {
            return;
        };

        if !dev_mode {
            ctx.speech.say("Uploading requires development mode");
        } else if !ready {
            ctx.speech.say("Workshop is not initialized");
        } else if entry.source != ModSource::Local {
            ctx.speech.say(format!("{name} is not a local mod"));
        } else if with_mods(ctx, "upload mod", |mods| mods.upload(&entry.key)).is_some() {
            ctx.speech.say(format!("Uploading {name} to the Workshop"));
        }
    }

    pub fn save_changes(&mut self, ctx: &mut ModeContext<'_>) -> bool {
        let saved = with_mods(ctx, "save mod list", |mods| mods.save()).is_some();
        if saved {
            ctx.speech.say("Mod list saved");
        }
        saved
    }
}

impl ModalController for ModListBrowser {
    fn kind(&self) -> ModeKind {
        ModeKind::ModList
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn confirm(&mut self, ctx: &mut ModeContext<'_>) {
        if self.save_changes(ctx) {
            self.exit();
        }
    }

    fn cancel(&mut self, ctx: &mut ModeContext<'_>) {
        if self.active {
            ctx.speech.say("Mod list closed");
        }
        self.exit();
    }

    fn exit(&mut self) {
        self.active = false;
        self.column = ModColumn::Active;
        self.index = 0;
        self.remembered.clear();
    }

    fn handle_input(&mut self, key: &KeyEvent, ctx: &mut ModeContext<'_>) -> bool {
        if !self.active {
            return false;
        }

        if let Some(code) = with_ctrl(key) {
            match code {
                KeyCode::Up => self.move_up(ctx),
                KeyCode::Down => self.move_down(ctx),
                code if is_letter(code, 's') => {
                    self.save_changes(ctx);
                }
                _ => return false,
            }
            return true;
        }

        let Some(code) = unmodified(key) else {
            return false;
        };
        match code {
            KeyCode::Down => self.select_next(ctx),
            KeyCode::Up => self.select_previous(ctx),
            KeyCode::Home => self.select_first(ctx),
            KeyCode::End => self.select_last(ctx),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => self.switch_column(ctx),
            KeyCode::Char(' ') => self.toggle_selected(ctx),
            KeyCode::Enter => self.confirm(ctx),
            KeyCode::Esc => self.cancel(ctx),
            code if is_letter(code, 'a') => self.auto_sort(ctx),
            code if is_letter(code, 'o') => self.open_settings(ctx),
            code if is_letter(code, 'i') => self.read_info(ctx),
            code if is_letter(code, 'f') => self.open_mod_folder(ctx),
            code if is_letter(code, 'w') => self.open_workshop_page(ctx),
            code if is_letter(code, 'u') => self.upload_to_workshop(ctx),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
#[path = "mod_list_tests.rs"]
mod tests;
