//! Versioned adapter between the modes and the host game.
//!
//! The host owns the cursor, the map areas, the command buttons of selected
//! things, the mod registry and the dialog tree. Each capability is exposed
//! through one narrow trait, reached through [`Host`]. An accessor that cannot
//! serve its capability (a field missing in this host build, say) returns
//! [`HostError::Unavailable`] instead of guessing.

pub mod memory;

use std::error::Error as StdError;
use std::fmt;

/// Adapter revision the modes are written against.
pub const ADAPTER_VERSION: u32 = 1;

/// Host capabilities the modes depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Cursor,
    Areas,
    Commands,
    ModRegistry,
    Workshop,
    Dialog,
}

impl Capability {
    pub fn display_name(self) -> &'static str {
        match self {
            Capability::Cursor => "Map cursor",
            Capability::Areas => "Area editing",
            Capability::Commands => "Command buttons",
            Capability::ModRegistry => "Mod list",
            Capability::Workshop => "Workshop",
            Capability::Dialog => "Dialog",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host does not expose this capability in its current build.
    Unavailable {
        capability: Capability,
        detail: String,
    },
    /// The adapter was written for a different host interface revision.
    VersionMismatch { expected: u32, found: u32 },
    /// The host refused an operation the adapter forwarded.
    Failed {
        capability: Capability,
        detail: String,
    },
}

impl HostError {
    pub fn unavailable(capability: Capability, detail: impl Into<String>) -> Self {
        HostError::Unavailable {
            capability,
            detail: detail.into(),
        }
    }

    pub fn failed(capability: Capability, detail: impl Into<String>) -> Self {
        HostError::Failed {
            capability,
            detail: detail.into(),
        }
    }

    /// Short sentence suitable for narration.
    pub fn narration(&self) -> String {
        match self {
            HostError::Unavailable { capability, .. } => {
                format!("{} is unavailable", capability.display_name())
            }
            HostError::VersionMismatch { .. } => {
                "Accessibility support does not match this game version".to_string()
            }
            HostError::Failed { capability, .. } => {
                format!("{} failed", capability.display_name())
            }
        }
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Unavailable { capability, detail } => {
                write!(f, "{} unavailable: {detail}", capability.display_name())
            }
            HostError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "host adapter version mismatch (expected {expected}, found {found})"
                )
            }
            HostError::Failed { capability, detail } => {
                write!(f, "{} failed: {detail}", capability.display_name())
            }
        }
    }
}

impl StdError for HostError {}

// ============================================================================
// Map and cursor
// ============================================================================

/// Map grid coordinate. The game's ground plane is x/z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

impl Cell {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub cell: Cell,
    pub valid: bool,
}

pub trait CursorProvider {
    fn position(&self) -> CursorPosition;

    /// Whether `cell` lies on the currently displayed map.
    fn in_bounds(&self, cell: Cell) -> bool;
}

// ============================================================================
// Areas
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AreaId(pub u32);

/// Named boolean membership map over map cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaRef {
    pub id: AreaId,
    pub label: String,
}

pub trait AreaStore {
    fn contains(&self, area: AreaId, cell: Cell) -> Result<bool, HostError>;

    fn set(&mut self, area: AreaId, cell: Cell, member: bool) -> Result<(), HostError>;

    /// Number of cells currently in the area.
    fn cell_count(&self, area: AreaId) -> Result<usize, HostError>;
}

// ============================================================================
// Command buttons ("gizmos")
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GizmoId(pub u64);

/// Behaviour a command triggers once invoked.
#[derive(Debug, Clone, PartialEq)]
pub enum GizmoKind {
    Plain,
    /// On/off switch whose state can be read back after invoking.
    Toggle,
    /// Starts a placement interaction (designators, blueprints).
    Placement,
    /// Waits for the user to pick a target with the cursor.
    Targeted { actor: String, verb: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gizmo {
    pub id: GizmoId,
    pub label: String,
    pub description: Option<String>,
    pub hotkey: Option<String>,
    pub visible: bool,
    pub disabled: bool,
    pub disabled_reason: Option<String>,
    pub order: f32,
    pub kind: GizmoKind,
}

impl Gizmo {
    pub fn new(id: u64, label: impl Into<String>, kind: GizmoKind) -> Self {
        Self {
            id: GizmoId(id),
            label: label.into(),
            description: None,
            hotkey: None,
            visible: true,
            disabled: false,
            disabled_reason: None,
            order: 0.0,
            kind,
        }
    }
}

pub trait CommandSource {
    /// Commands of every currently selected thing, in collection order.
    fn selection_gizmos(&self) -> Result<Vec<Gizmo>, HostError>;

    /// Commands of the things standing on `cell`.
    fn gizmos_at(&self, cell: Cell) -> Result<Vec<Gizmo>, HostError>;

    /// Replaces the host selection with the things on `cell`. Returns how many
    /// things were selected.
    fn select_at(&mut self, cell: Cell) -> Result<usize, HostError>;

    fn invoke(&mut self, id: GizmoId) -> Result<(), HostError>;

    fn toggle_state(&self, id: GizmoId) -> Result<bool, HostError>;
}

// ============================================================================
// Mod registry
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModColumn {
    Active,
    Inactive,
}

impl ModColumn {
    pub fn other(self) -> Self {
        match self {
            ModColumn::Active => ModColumn::Inactive,
            ModColumn::Inactive => ModColumn::Active,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModColumn::Active => "Active mods",
            ModColumn::Inactive => "Inactive mods",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModSource {
    Core,
    Expansion,
    Local,
    Workshop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModEntry {
    /// Identity of this installed copy (its folder). Two copies may share a
    /// package id, but never a key.
    pub key: String,
    pub name: String,
    pub package_id: String,
    pub active: bool,
    pub version_compatible: bool,
    pub source: ModSource,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModDetails {
    pub author: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Done,
    /// Another active mod already uses this package id.
    Conflict { other: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderOutcome {
    Done,
    Rejected { reason: String },
}

pub trait ModRegistry {
    /// Live filtered view of one column.
    fn column(&self, column: ModColumn) -> Result<Vec<ModEntry>, HostError>;

    /// Key of the entry the host list currently highlights.
    fn primary_selection(&self) -> Option<String>;

    fn set_primary_selection(&mut self, key: &str);

    fn set_enabled(&mut self, key: &str, enabled: bool) -> Result<ToggleOutcome, HostError>;

    /// Package ids of every active mod in load order, ignoring filters.
    fn load_order(&self) -> Result<Vec<String>, HostError>;

    fn reorder(&mut self, from: usize, to: usize) -> Result<ReorderOutcome, HostError>;

    fn auto_sort(&mut self) -> Result<(), HostError>;

    fn details(&self, key: &str) -> Result<ModDetails, HostError>;

    fn has_settings(&self, key: &str) -> bool;

    fn open_settings(&mut self, key: &str) -> Result<(), HostError>;

    fn open_folder(&mut self, key: &str) -> Result<(), HostError>;

    fn open_workshop_page(&mut self, key: &str) -> Result<(), HostError>;

    fn dev_mode(&self) -> bool;

    fn workshop_ready(&self) -> bool;

    fn upload(&mut self, key: &str) -> Result<(), HostError>;

    fn save(&mut self) -> Result<(), HostError>;
}

// ============================================================================
// Dialog tree
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogOption {
    pub text: String,
    pub disabled: bool,
    pub disabled_reason: Option<String>,
}

impl DialogOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            disabled: false,
            disabled_reason: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogNode {
    pub id: NodeId,
    pub text: String,
    pub options: Vec<DialogOption>,
}

pub trait DialogModel {
    /// Node currently on screen, if a dialog is open.
    fn current_node(&self) -> Option<DialogNode>;

    fn activate(&mut self, index: usize) -> Result<(), HostError>;
}

// ============================================================================
// Adapter root
// ============================================================================

pub trait Host {
    fn adapter_version(&self) -> u32;

    /// A game is loaded and a map is on screen.
    fn in_game(&self) -> bool;

    fn cursor(&self) -> Result<&dyn CursorProvider, HostError>;

    fn areas(&mut self) -> Result<&mut dyn AreaStore, HostError>;

    fn commands(&mut self) -> Result<&mut dyn CommandSource, HostError>;

    fn mods(&mut self) -> Result<&mut dyn ModRegistry, HostError>;

    fn dialog(&mut self) -> Result<&mut dyn DialogModel, HostError>;
}

/// Rejects hosts built against another adapter revision.
pub fn check_version(host: &dyn Host) -> Result<(), HostError> {
    let found = host.adapter_version();
    if found == ADAPTER_VERSION {
        Ok(())
    } else {
        Err(HostError::VersionMismatch {
            expected: ADAPTER_VERSION,
            found,
        })
    }
}
