//! Catalogue of named layout presets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Lowercase and drop every non-alphanumeric character, so that
/// "Full Overlay", "fulloverlay" and "full-overlay" compare equal.
pub fn normalize_name(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// The global panel set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PanelKey {
    Timer,
    Tasks,
    Backlog,
    ViewerInfo,
}

impl PanelKey {
    pub const ALL: [PanelKey; 4] = [
        PanelKey::Timer,
        PanelKey::Tasks,
        PanelKey::Backlog,
        PanelKey::ViewerInfo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PanelKey::Timer => "timer",
            PanelKey::Tasks => "tasks",
            PanelKey::Backlog => "backlog",
            PanelKey::ViewerInfo => "viewer-info",
        }
    }
}

impl fmt::Display for PanelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelKey {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "timer" | "pomodoro" | "pomo" => Ok(PanelKey::Timer),
            "tasks" | "task" | "tasklist" => Ok(PanelKey::Tasks),
            "backlog" => Ok(PanelKey::Backlog),
            "viewerinfo" | "viewer" | "info" => Ok(PanelKey::ViewerInfo),
            _ => Err(LayoutError::UnknownPanel(s.to_string())),
        }
    }
}

impl From<PanelKey> for String {
    fn from(key: PanelKey) -> Self {
        key.as_str().to_string()
    }
}

impl TryFrom<String> for PanelKey {
    type Error = LayoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Canvas-relative pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub left: i32,
    pub top: i32,
}

impl Position {
    pub fn new(left: i32, top: i32) -> Self {
        Self { left, top }
    }
}

/// Width and height of a rendered box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: u32,
    pub height: u32,
}

impl BoxSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Declared panel size with optional bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSize {
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
}

impl PanelSize {
    pub fn fixed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Declared size after applying min/max bounds.
    pub fn effective(&self) -> BoxSize {
        let bound = |v: u32, min: Option<u32>, max: Option<u32>| {
            let v = min.map_or(v, |m| v.max(m));
            max.map_or(v, |m| v.min(m))
        };
        BoxSize {
            width: bound(self.width, self.min_width, self.max_width),
            height: bound(self.height, self.min_height, self.max_height),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Block,
    Flex,
    Grid,
}

/// How one panel appears in a preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelPreset {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub display: DisplayMode,
    pub position: Position,
    pub size: PanelSize,
}

fn default_enabled() -> bool {
    true
}

impl PanelPreset {
    fn at(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            enabled: true,
            display: DisplayMode::Block,
            position: Position::new(left, top),
            size: PanelSize::fixed(width, height),
        }
    }

    fn display(mut self, display: DisplayMode) -> Self {
        self.display = display;
        self
    }

    fn bounded(mut self, min: BoxSize, max: BoxSize) -> Self {
        self.size.min_width = Some(min.width);
        self.size.min_height = Some(min.height);
        self.size.max_width = Some(max.width);
        self.size.max_height = Some(max.height);
        self
    }
}

/// A named, immutable layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutPreset {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub padding: u32,
    pub panels: BTreeMap<PanelKey, PanelPreset>,
}

impl LayoutPreset {
    fn new(name: &str, display_name: &str, description: &str, padding: u32) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            padding,
            panels: BTreeMap::new(),
        }
    }

    fn with(mut self, key: PanelKey, panel: PanelPreset) -> Self {
        self.panels.insert(key, panel);
        self
    }

    /// The preset entry for `key` if the preset shows it.
    pub fn enabled_panel(&self, key: PanelKey) -> Option<&PanelPreset> {
        self.panels.get(&key).filter(|p| p.enabled)
    }

    pub fn enabled_panels(&self) -> Vec<PanelKey> {
        PanelKey::ALL
            .into_iter()
            .filter(|k| self.enabled_panel(*k).is_some())
            .collect()
    }

    pub fn summary(&self) -> LayoutSummary {
        LayoutSummary {
            key: self.name.clone(),
            display_name: self.display_name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Read-only listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSummary {
    pub key: String,
    pub display_name: String,
    pub description: String,
}

/// Presets available to the layout engine, in declaration order.
#[derive(Debug, Clone)]
pub struct LayoutRegistry {
    presets: Vec<LayoutPreset>,
}

impl LayoutRegistry {
    /// The presets shipped with the overlay, laid out for a 1920x1080 canvas.
    pub fn builtin() -> Self {
        use PanelKey::*;

        let full = LayoutPreset::new(
            "full",
            "Full Overlay",
            "Every panel: tasks and viewer info on the left, timer and backlog on the right",
            20,
        )
        .with(Tasks, PanelPreset::at(20, 20, 420, 640).display(DisplayMode::Flex))
        .with(ViewerInfo, PanelPreset::at(20, 680, 420, 300))
        .with(Timer, PanelPreset::at(1480, 20, 420, 220))
        .with(Backlog, PanelPreset::at(1480, 260, 420, 400).display(DisplayMode::Flex));

        let compact = LayoutPreset::new(
            "compact",
            "Compact",
            "Timer stacked above the task list in the top-left corner",
            10,
        )
        .with(Timer, PanelPreset::at(20, 20, 360, 180))
        .with(
            Tasks,
            PanelPreset::at(20, 220, 360, 500)
                .display(DisplayMode::Flex)
                .bounded(BoxSize::new(280, 200), BoxSize::new(480, 800)),
        );

        let split = LayoutPreset::new(
            "split",
            "Split View",
            "Task list down the left edge, timer and backlog down the right",
            40,
        )
        .with(Tasks, PanelPreset::at(40, 40, 600, 1000).display(DisplayMode::Flex))
        .with(Timer, PanelPreset::at(1280, 40, 600, 260))
        .with(Backlog, PanelPreset::at(1280, 340, 600, 700).display(DisplayMode::Flex));

        let focus = LayoutPreset::new(
            "focus",
            "Focus Mode",
            "Only the timer, centred",
            0,
        )
        .with(Timer, PanelPreset::at(710, 390, 500, 300).display(DisplayMode::Grid));

        let community = LayoutPreset::new(
            "community",
            "Community",
            "Viewer info and backlog for chat-heavy streams",
            20,
        )
        .with(ViewerInfo, PanelPreset::at(20, 20, 400, 360))
        .with(Backlog, PanelPreset::at(20, 400, 400, 600).display(DisplayMode::Flex))
        .with(Timer, PanelPreset {
            enabled: false,
            ..PanelPreset::at(1500, 20, 400, 200)
        });

        Self {
            presets: vec![full, compact, split, focus, community],
        }
    }

    /// Built-in presets followed by `extra`. Keys must stay unique.
    pub fn with_extra(extra: Vec<LayoutPreset>) -> Result<Self, LayoutError> {
        let mut registry = Self::builtin();
        for preset in extra {
            if registry.get(&preset.name).is_some() {
                return Err(LayoutError::DuplicatePreset(preset.name));
            }
            registry.presets.push(preset);
        }
        Ok(registry)
    }

    /// Exact, case-sensitive lookup by internal key.
    pub fn get(&self, key: &str) -> Option<&LayoutPreset> {
        self.presets.iter().find(|p| p.name == key)
    }

    /// Lenient lookup by key or display name, for chat input.
    pub fn resolve(&self, input: &str) -> Option<&LayoutPreset> {
        let wanted = normalize_name(input);
        if wanted.is_empty() {
            return None;
        }
        self.presets.iter().find(|p| {
            normalize_name(&p.name) == wanted || normalize_name(&p.display_name) == wanted
        })
    }

    pub fn available(&self) -> Vec<LayoutSummary> {
        self.presets.iter().map(LayoutPreset::summary).collect()
    }

    pub fn presets(&self) -> &[LayoutPreset] {
        &self.presets
    }
}

impl Default for LayoutRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
