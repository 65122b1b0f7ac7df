//! Persisted per-layout, per-panel position overrides.
//!
//! Stored under [`PANEL_POSITIONS_KEY`] as
//! `{ "<layout>": { "<panel>": { "left": i32, "top": i32 } } }`.

use std::collections::BTreeMap;
use std::rc::Rc;

use super::registry::{PanelKey, Position};
use crate::storage::{load_json, save_json, KvStore};

pub const PANEL_POSITIONS_KEY: &str = "panel_positions";

pub type PositionMap = BTreeMap<String, BTreeMap<PanelKey, Position>>;

pub struct PanelPositionStore {
    overrides: PositionMap,
    store: Rc<dyn KvStore>,
}

impl PanelPositionStore {
    /// Load overrides from `store`, starting empty if nothing usable is there.
    pub fn load(store: Rc<dyn KvStore>) -> Self {
        let overrides = load_json(store.as_ref(), PANEL_POSITIONS_KEY).unwrap_or_default();
        Self { overrides, store }
    }

    pub fn get(&self, layout: &str, panel: PanelKey) -> Option<Position> {
        self.overrides.get(layout)?.get(&panel).copied()
    }

    pub fn for_layout(&self, layout: &str) -> Option<&BTreeMap<PanelKey, Position>> {
        self.overrides.get(layout)
    }

    pub fn all(&self) -> &PositionMap {
        &self.overrides
    }

    pub fn set(&mut self, layout: &str, panel: PanelKey, position: Position) {
        self.overrides
            .entry(layout.to_string())
            .or_default()
            .insert(panel, position);
        self.persist();
    }

    /// Drop one override. Returns whether one existed.
    pub fn remove(&mut self, layout: &str, panel: PanelKey) -> bool {
        let Some(panels) = self.overrides.get_mut(layout) else {
            return false;
        };
        let removed = panels.remove(&panel).is_some();
        if panels.is_empty() {
            self.overrides.remove(layout);
        }
        if removed {
            self.persist();
        }
        removed
    }

    /// Drop every override for `layout`. Returns how many were removed.
    pub fn clear_layout(&mut self, layout: &str) -> usize {
        let removed = self.overrides.remove(layout).map_or(0, |panels| panels.len());
        if removed > 0 {
            self.persist();
        }
        removed
    }

    fn persist(&self) {
        save_json(self.store.as_ref(), PANEL_POSITIONS_KEY, &self.overrides);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> Rc<dyn KvStore> {
        Rc::new(MemoryStore::new())
    }

    #[test]
    fn set_get_and_reload() {
        let kv = store();
        let mut positions = PanelPositionStore::load(kv.clone());
        positions.set("split", PanelKey::Timer, Position::new(10, 20));

        let reloaded = PanelPositionStore::load(kv);
        assert_eq!(
            reloaded.get("split", PanelKey::Timer),
            Some(Position::new(10, 20))
        );
        assert_eq!(reloaded.get("compact", PanelKey::Timer), None);
    }

    #[test]
    fn persisted_schema_uses_panel_names() {
        let kv = store();
        let mut positions = PanelPositionStore::load(kv.clone());
        positions.set("full", PanelKey::ViewerInfo, Position::new(5, 6));
        let raw = kv.get(PANEL_POSITIONS_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["full"]["viewer-info"]["left"], 5);
        assert_eq!(json["full"]["viewer-info"]["top"], 6);
    }

    #[test]
    fn remove_only_touches_one_panel() {
        let mut positions = PanelPositionStore::load(store());
        positions.set("split", PanelKey::Timer, Position::new(1, 1));
        positions.set("split", PanelKey::Tasks, Position::new(2, 2));

        assert!(positions.remove("split", PanelKey::Timer));
        assert!(!positions.remove("split", PanelKey::Timer));
        assert_eq!(positions.get("split", PanelKey::Tasks), Some(Position::new(2, 2)));
    }

    #[test]
    fn clear_layout_counts_removed() {
        let mut positions = PanelPositionStore::load(store());
        positions.set("split", PanelKey::Timer, Position::new(1, 1));
        positions.set("split", PanelKey::Backlog, Position::new(2, 2));
        positions.set("full", PanelKey::Timer, Position::new(3, 3));

        assert_eq!(positions.clear_layout("split"), 2);
        assert_eq!(positions.clear_layout("split"), 0);
        assert!(positions.for_layout("full").is_some());
    }
}
