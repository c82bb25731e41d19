//! In-process host backed by plain collections.
//!
//! Drives the `demo` command and the test suite. Every capability can be
//! switched off with [`MemoryHost::disable`] to exercise the unavailable paths.

use std::collections::{BTreeSet, HashMap, HashSet};

use super::{
    AreaId, AreaRef, AreaStore, Capability, Cell, CommandSource, CursorPosition, CursorProvider,
    DialogModel, DialogNode, DialogOption, Gizmo, GizmoId, GizmoKind, Host, HostError,
    ModColumn, ModDetails, ModEntry, ModRegistry, ModSource, NodeId, ReorderOutcome,
    ToggleOutcome, ADAPTER_VERSION,
};

pub const HOME_AREA: AreaId = AreaId(1);
pub const GROWING_AREA: AreaId = AreaId(2);

#[derive(Debug, Clone)]
pub struct MemoryMap {
    pub width: i32,
    pub height: i32,
    pub cursor: CursorPosition,
}

impl MemoryMap {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cursor: CursorPosition {
                cell: Cell::new(width / 2, height / 2),
                valid: true,
            },
        }
    }

    pub fn move_cursor_to(&mut self, cell: Cell) {
        self.cursor = CursorPosition { cell, valid: true };
    }

    /// Steps the cursor, stopping at the map edge.
    pub fn move_cursor_by(&mut self, dx: i32, dz: i32) -> Cell {
        let cell = Cell::new(
            (self.cursor.cell.x + dx).clamp(0, self.width - 1),
            (self.cursor.cell.z + dz).clamp(0, self.height - 1),
        );
        self.move_cursor_to(cell);
        cell
    }
}

impl CursorProvider for MemoryMap {
    fn position(&self) -> CursorPosition {
        self.cursor
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.z)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryAreas {
    pub areas: Vec<AreaRef>,
    /// Write number (counting from 1) that the host refuses.
    pub fail_on_write: Option<usize>,
    writes: usize,
    members: HashMap<AreaId, BTreeSet<Cell>>,
}

impl MemoryAreas {
    pub fn add_area(&mut self, id: AreaId, label: impl Into<String>) {
        self.areas.push(AreaRef {
            id,
            label: label.into(),
        });
        self.members.entry(id).or_default();
    }

    pub fn insert(&mut self, area: AreaId, cell: Cell) {
        self.members.entry(area).or_default().insert(cell);
    }

    pub fn cells(&self, area: AreaId) -> BTreeSet<Cell> {
        self.members.get(&area).cloned().unwrap_or_default()
    }

    pub fn get(&self, id: AreaId) -> Option<&AreaRef> {
        self.areas.iter().find(|area| area.id == id)
    }

    fn members(&self, area: AreaId) -> Result<&BTreeSet<Cell>, HostError> {
        self.members
            .get(&area)
            .ok_or_else(|| HostError::failed(Capability::Areas, format!("no area {}", area.0)))
    }
}

impl AreaStore for MemoryAreas {
    fn contains(&self, area: AreaId, cell: Cell) -> Result<bool, HostError> {
        Ok(self.members(area)?.contains(&cell))
    }

    fn set(&mut self, area: AreaId, cell: Cell, member: bool) -> Result<(), HostError> {
        self.members(area)?;
        self.writes += 1;
        if self.fail_on_write == Some(self.writes) {
            return Err(HostError::failed(Capability::Areas, "cell is locked"));
        }
        let cells = self.members.entry(area).or_default();
        if member {
            cells.insert(cell);
        } else {
            cells.remove(&cell);
        }
        Ok(())
    }

    fn cell_count(&self, area: AreaId) -> Result<usize, HostError> {
        Ok(self.members(area)?.len())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCommands {
    pub selection: Vec<Gizmo>,
    pub at: HashMap<Cell, Vec<Gizmo>>,
    pub toggles: HashMap<GizmoId, bool>,
    /// Host calls in the order they happened.
    pub calls: Vec<String>,
}

impl CommandSource for MemoryCommands {
    fn selection_gizmos(&self) -> Result<Vec<Gizmo>, HostError> {
        Ok(self.selection.clone())
    }

    fn gizmos_at(&self, cell: Cell) -> Result<Vec<Gizmo>, HostError> {
        Ok(self.at.get(&cell).cloned().unwrap_or_default())
    }

    fn select_at(&mut self, cell: Cell) -> Result<usize, HostError> {
        self.calls.push(format!("select_at {cell}"));
        let gizmos = self.at.get(&cell).cloned().unwrap_or_default();
        let count = gizmos.len();
        self.selection = gizmos;
        Ok(count)
    }

    fn invoke(&mut self, id: GizmoId) -> Result<(), HostError> {
        self.calls.push(format!("invoke {}", id.0));
        if let Some(state) = self.toggles.get_mut(&id) {
            *state = !*state;
        }
        Ok(())
    }

    fn toggle_state(&self, id: GizmoId) -> Result<bool, HostError> {
        self.toggles
            .get(&id)
            .copied()
            .ok_or_else(|| HostError::failed(Capability::Commands, format!("{} is not a toggle", id.0)))
    }
}

#[derive(Debug, Clone)]
pub struct MemoryMods {
    /// Every installed mod. Inactive ones are listed in this order.
    pub entries: Vec<ModEntry>,
    /// Keys of the active mods in load order.
    pub order: Vec<String>,
    /// Case-insensitive name filter applied to both columns.
    pub filter: Option<String>,
    pub primary: Option<String>,
    pub details: HashMap<String, ModDetails>,
    pub settings: HashSet<String>,
    pub dev_mode: bool,
    pub workshop_ready: bool,
    pub workshop_available: bool,
    /// When set, every reorder is refused with this reason.
    pub reject_reorder: Option<String>,
    pub calls: Vec<String>,
    pub saves: usize,
}

impl Default for MemoryMods {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            order: Vec::new(),
            filter: None,
            primary: None,
            details: HashMap::new(),
            settings: HashSet::new(),
            dev_mode: false,
            workshop_ready: true,
            workshop_available: true,
            reject_reorder: None,
            calls: Vec::new(),
            saves: 0,
        }
    }
}

impl MemoryMods {
    /// Installs `entry`, appending it to the load order when active.
    pub fn install(&mut self, entry: ModEntry) {
        if entry.active {
            self.order.push(entry.key.clone());
        }
        self.entries.push(entry);
    }

    pub fn entry(&self, key: &str) -> Option<&ModEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    fn entry_mut(&mut self, key: &str) -> Result<&mut ModEntry, HostError> {
        self.entries
            .iter_mut()
            .find(|entry| entry.key == key)
            .ok_or_else(|| HostError::failed(Capability::ModRegistry, format!("unknown mod {key}")))
    }

    fn known(&self, key: &str) -> Result<&ModEntry, HostError> {
        self.entry(key)
            .ok_or_else(|| HostError::failed(Capability::ModRegistry, format!("unknown mod {key}")))
    }

    fn passes_filter(&self, entry: &ModEntry) -> bool {
        match self.filter.as_deref() {
            Some(filter) if !filter.is_empty() => entry
                .name
                .to_lowercase()
                .contains(&filter.to_lowercase()),
            _ => true,
        }
    }

    fn workshop(&self) -> Result<(), HostError> {
        if self.workshop_available {
            Ok(())
        } else {
            Err(HostError::unavailable(
                Capability::Workshop,
                "workshop client not loaded",
            ))
        }
    }

    fn sort_rank(entry: &ModEntry) -> (u8, String) {
        let rank = match entry.source {
            ModSource::Core => 0,
            ModSource::Expansion => 1,
            ModSource::Local | ModSource::Workshop => 2,
        };
        (rank, entry.name.to_lowercase())
    }
}

impl ModRegistry for MemoryMods {
    fn column(&self, column: ModColumn) -> Result<Vec<ModEntry>, HostError> {
        let entries = match column {
            ModColumn::Active => self
                .order
                .iter()
                .filter_map(|key| self.entry(key))
                .filter(|entry| self.passes_filter(entry))
                .cloned()
                .collect(),
            ModColumn::Inactive => self
                .entries
                .iter()
                .filter(|entry| !entry.active && self.passes_filter(entry))
                .cloned()
                .collect(),
        };
        Ok(entries)
    }

    fn primary_selection(&self) -> Option<String> {
        self.primary.clone()
    }

    fn set_primary_selection(&mut self, key: &str) {
        self.primary = Some(key.to_string());
    }

    fn set_enabled(&mut self, key: &str, enabled: bool) -> Result<ToggleOutcome, HostError> {
        let entry = self.known(key)?.clone();
        if entry.active == enabled {
            return Ok(ToggleOutcome::Done);
        }

        if enabled {
            let clash = self
                .entries
                .iter()
                .find(|other| other.active && other.package_id == entry.package_id);
            if let Some(other) = clash {
                return Ok(ToggleOutcome::Conflict {
                    other: other.name.clone(),
                });
            }
            self.order.push(key.to_string());
        } else {
            self.order.retain(|active| active != key);
        }
        self.entry_mut(key)?.active = enabled;
        self.calls.push(format!("set_enabled {key} {enabled}"));
        Ok(ToggleOutcome::Done)
    }

    fn load_order(&self) -> Result<Vec<String>, HostError> {
        Ok(self
            .order
            .iter()
            .filter_map(|key| self.entry(key))
            .map(|entry| entry.package_id.clone())
            .collect())
    }

    fn reorder(&mut self, from: usize, to: usize) -> Result<ReorderOutcome, HostError> {
        if let Some(reason) = &self.reject_reorder {
            return Ok(ReorderOutcome::Rejected {
                reason: reason.clone(),
            });
        }
        if from >= self.order.len() || to >= self.order.len() {
            return Err(HostError::failed(
                Capability::ModRegistry,
                format!("reorder {from} -> {to} outside load order"),
            ));
        }
        let key = self.order.remove(from);
        self.order.insert(to, key);
        self.calls.push(format!("reorder {from} {to}"));
        Ok(ReorderOutcome::Done)
    }

    fn auto_sort(&mut self) -> Result<(), HostError> {
        let mut ranked: Vec<((u8, String), String)> = self
            .order
            .iter()
            .filter_map(|key| self.entry(key))
            .map(|entry| (Self::sort_rank(entry), entry.key.clone()))
            .collect();
        ranked.sort();
        self.order = ranked.into_iter().map(|(_, key)| key).collect();
        self.calls.push("auto_sort".to_string());
        Ok(())
    }

    fn details(&self, key: &str) -> Result<ModDetails, HostError> {
        self.known(key)?;
        Ok(self.details.get(key).cloned().unwrap_or_default())
    }

    fn has_settings(&self, key: &str) -> bool {
        self.settings.contains(key)
    }

    fn open_settings(&mut self, key: &str) -> Result<(), HostError> {
        self.known(key)?;
        self.calls.push(format!("open_settings {key}"));
        Ok(())
    }

    fn open_folder(&mut self, key: &str) -> Result<(), HostError> {
        self.known(key)?;
        self.calls.push(format!("open_folder {key}"));
        Ok(())
    }

    fn open_workshop_page(&mut self, key: &str) -> Result<(), HostError> {
        self.workshop()?;
        self.known(key)?;
        self.calls.push(format!("open_workshop_page {key}"));
        Ok(())
    }

    fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    fn workshop_ready(&self) -> bool {
        self.workshop_available && self.workshop_ready
    }

    fn upload(&mut self, key: &str) -> Result<(), HostError> {
        self.workshop()?;
        self.known(key)?;
        self.calls.push(format!("upload {key}"));
        Ok(())
    }

    fn save(&mut self) -> Result<(), HostError> {
        self.saves += 1;
        self.calls.push("save".to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDialog {
    pub current: Option<DialogNode>,
    /// Node shown after choosing option `index` on node `id`. Choosing an
    /// option with no entry closes the dialog.
    pub next: HashMap<(NodeId, usize), DialogNode>,
    pub activated: Vec<(NodeId, usize)>,
}

impl MemoryDialog {
    pub fn start(&mut self, node: DialogNode) {
        self.current = Some(node);
    }

    /// Two-node conversation used by the demo.
    pub fn start_sample(&mut self) {
        let greeting = DialogNode {
            id: NodeId(1),
            text: "A trader caravan from the Outlanders asks to trade.".to_string(),
            options: vec![
                DialogOption::new("Trade with them"),
                DialogOption {
                    disabled: true,
                    disabled_reason: Some("No one can speak to them".to_string()),
                    ..DialogOption::new("Ask about the rumours")
                },
                DialogOption::new("Send them away"),
            ],
        };
        let farewell = DialogNode {
            id: NodeId(2),
            text: "The caravan packs up and leaves.".to_string(),
            options: vec![DialogOption::new("Close")],
        };
        self.next.insert((NodeId(1), 2), farewell);
        self.start(greeting);
    }
}

impl DialogModel for MemoryDialog {
    fn current_node(&self) -> Option<DialogNode> {
        self.current.clone()
    }

    fn activate(&mut self, index: usize) -> Result<(), HostError> {
        let node = self
            .current
            .as_ref()
            .ok_or_else(|| HostError::failed(Capability::Dialog, "no dialog open"))?;
        if index >= node.options.len() {
            return Err(HostError::failed(
                Capability::Dialog,
                format!("option {index} out of range"),
            ));
        }
        let id = node.id;
        self.activated.push((id, index));
        self.current = self.next.remove(&(id, index));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MemoryHost {
    pub version: u32,
    pub in_game: bool,
    pub map: MemoryMap,
    pub areas: MemoryAreas,
    pub commands: MemoryCommands,
    pub mods: MemoryMods,
    pub dialog: MemoryDialog,
    unavailable: HashSet<Capability>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self {
            version: ADAPTER_VERSION,
            in_game: true,
            map: MemoryMap::new(30, 30),
            areas: MemoryAreas::default(),
            commands: MemoryCommands::default(),
            mods: MemoryMods::default(),
            dialog: MemoryDialog::default(),
            unavailable: HashSet::new(),
        }
    }
}

fn mod_entry(key: &str, name: &str, package_id: &str, source: ModSource, active: bool) -> ModEntry {
    ModEntry {
        key: key.to_string(),
        name: name.to_string(),
        package_id: package_id.to_string(),
        active,
        version_compatible: true,
        source,
        warning: None,
    }
}

impl MemoryHost {
    /// A small colony: a 30 by 30 map, two areas, a few commands and a mod
    /// list with one duplicate package id.
    pub fn sample() -> Self {
        let mut host = Self::default();

        host.areas.add_area(HOME_AREA, "Home");
        host.areas.add_area(GROWING_AREA, "Growing zone");
        for x in 12..16 {
            for z in 12..16 {
                host.areas.insert(HOME_AREA, Cell::new(x, z));
            }
        }

        let mut draft = Gizmo::new(1, "Draft", GizmoKind::Toggle);
        draft.hotkey = Some("R".to_string());
        draft.description = Some("Take direct control of the colonist.".to_string());
        let mut forbid = Gizmo::new(2, "Forbid", GizmoKind::Toggle);
        forbid.order = 10.0;
        let mut launch = Gizmo::new(3, "Launch", GizmoKind::Plain);
        launch.order = 20.0;
        launch.disabled = true;
        launch.disabled_reason = Some("No fuel".to_string());
        host.commands.toggles.insert(draft.id, false);
        host.commands.toggles.insert(forbid.id, false);
        host.commands.selection = vec![draft, forbid, launch];

        let mut reinstall = Gizmo::new(4, "Reinstall", GizmoKind::Placement);
        reinstall.order = 5.0;
        let attack = Gizmo::new(
            5,
            "Attack",
            GizmoKind::Targeted {
                actor: "Engie".to_string(),
                verb: "attack".to_string(),
            },
        );
        host.commands
            .at
            .insert(host.map.cursor.cell, vec![attack, reinstall]);

        let mods = &mut host.mods;
        mods.install(mod_entry("Core", "Core", "ludeon.rimworld", ModSource::Core, true));
        mods.install(mod_entry(
            "Royalty",
            "Royalty",
            "ludeon.rimworld.royalty",
            ModSource::Expansion,
            true,
        ));
        mods.install(mod_entry(
            "2009463077",
            "Harmony",
            "brrainz.harmony",
            ModSource::Workshop,
            true,
        ));
        mods.install(mod_entry(
            "818773962",
            "HugsLib",
            "unlimitedhugs.hugslib",
            ModSource::Workshop,
            true,
        ));
        let mut hygiene = mod_entry(
            "836308268",
            "Dubs Bad Hygiene",
            "dubwise.dubsbadhygiene",
            ModSource::Workshop,
            false,
        );
        hygiene.version_compatible = false;
        mods.install(hygiene);
        let mut local = mod_entry("MyTestMod", "My Test Mod", "me.testmod", ModSource::Local, false);
        local.warning = Some("About.xml is missing a <supportedVersions> list".to_string());
        mods.install(local);
        mods.install(mod_entry(
            "HarmonyLocal",
            "Harmony (local copy)",
            "brrainz.harmony",
            ModSource::Local,
            false,
        ));

        mods.details.insert(
            "818773962".to_string(),
            ModDetails {
                author: Some("UnlimitedHugs".to_string()),
                version: Some("11.0.5".to_string()),
                description: Some("A library for <b>RimWorld</b> modders.".to_string()),
            },
        );
        mods.settings.insert("818773962".to_string());
        mods.primary = Some("Core".to_string());

        host
    }

    /// Makes every accessor for `capability` fail as unavailable.
    pub fn disable(&mut self, capability: Capability) {
        if capability == Capability::Workshop {
            self.mods.workshop_available = false;
        }
        self.unavailable.insert(capability);
    }

    pub fn enable(&mut self, capability: Capability) {
        if capability == Capability::Workshop {
            self.mods.workshop_available = true;
        }
        self.unavailable.remove(&capability);
    }

    fn check(&self, capability: Capability) -> Result<(), HostError> {
        if self.unavailable.contains(&capability) {
            Err(HostError::unavailable(capability, "disabled in this host"))
        } else {
            Ok(())
        }
    }
}

impl Host for MemoryHost {
    fn adapter_version(&self) -> u32 {
        self.version
    }

    fn in_game(&self) -> bool {
        self.in_game
    }

    fn cursor(&self) -> Result<&dyn CursorProvider, HostError> {
        self.check(Capability::Cursor)?;
        Ok(&self.map)
    }

    fn areas(&mut self) -> Result<&mut dyn AreaStore, HostError> {
        self.check(Capability::Areas)?;
        Ok(&mut self.areas)
    }

    fn commands(&mut self) -> Result<&mut dyn CommandSource, HostError> {
        self.check(Capability::Commands)?;
        Ok(&mut self.commands)
    }

    fn mods(&mut self) -> Result<&mut dyn ModRegistry, HostError> {
        self.check(Capability::ModRegistry)?;
        Ok(&mut self.mods)
    }

    fn dialog(&mut self) -> Result<&mut dyn DialogModel, HostError> {
        self.check(Capability::Dialog)?;
        Ok(&mut self.dialog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::check_version;

    #[test]
    fn sample_cursor_starts_inside_the_map() {
        let host = MemoryHost::sample();
        let cursor = host.cursor().unwrap();
        let position = cursor.position();
        assert!(position.valid);
        assert!(cursor.in_bounds(position.cell));
        assert!(!cursor.in_bounds(Cell::new(30, 0)));
    }

    #[test]
    fn cursor_movement_stops_at_edges() {
        let mut map = MemoryMap::new(4, 4);
        map.move_cursor_to(Cell::new(0, 3));
        assert_eq!(map.move_cursor_by(-1, 1), Cell::new(0, 3));
        assert_eq!(map.move_cursor_by(2, -1), Cell::new(2, 2));
    }

    #[test]
    fn disabled_capability_is_unavailable() {
        let mut host = MemoryHost::sample();
        host.disable(Capability::Dialog);
        assert!(matches!(
            host.dialog().err(),
            Some(HostError::Unavailable {
                capability: Capability::Dialog,
                ..
            })
        ));
        host.enable(Capability::Dialog);
        assert!(host.dialog().is_ok());
    }

    #[test]
    fn version_mismatch_is_reported() {
        let mut host = MemoryHost::sample();
        assert!(check_version(&host).is_ok());
        host.version = ADAPTER_VERSION + 1;
        assert_eq!(
            check_version(&host),
            Err(HostError::VersionMismatch {
                expected: ADAPTER_VERSION,
                found: ADAPTER_VERSION + 1
            })
        );
    }

    #[test]
    fn enabling_duplicate_package_id_conflicts() {
        let mut host = MemoryHost::sample();
        let outcome = host.mods.set_enabled("HarmonyLocal", true).unwrap();
        assert_eq!(
            outcome,
            ToggleOutcome::Conflict {
                other: "Harmony".to_string()
            }
        );
        assert!(!host.mods.entry("HarmonyLocal").unwrap().active);
    }

    #[test]
    fn filter_applies_to_both_columns() {
        let mut host = MemoryHost::sample();
        host.mods.filter = Some("harm".to_string());
        let active = host.mods.column(ModColumn::Active).unwrap();
        let inactive = host.mods.column(ModColumn::Inactive).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(inactive.len(), 1);
        assert_eq!(host.mods.load_order().unwrap().len(), 4);
    }

    #[test]
    fn auto_sort_puts_core_content_first() {
        let mut host = MemoryHost::sample();
        host.mods.order.reverse();
        host.mods.auto_sort().unwrap();
        assert_eq!(
            host.mods.order,
            vec!["Core", "Royalty", "2009463077", "818773962"]
        );
    }

    #[test]
    fn dialog_follows_transitions_and_closes() {
        let mut dialog = MemoryDialog::default();
        dialog.start_sample();
        dialog.activate(2).unwrap();
        assert_eq!(dialog.current_node().map(|node| node.id), Some(NodeId(2)));
        assert!(dialog.activate(5).is_err());
        dialog.activate(0).unwrap();
        assert!(dialog.current_node().is_none());
    }
}
