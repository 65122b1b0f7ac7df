//! Layout engine.
//!
//! Applies presets to the canvas: decides which panels are visible, where
//! each one goes (stored override, else preset default) and keeps every
//! rendered box inside the canvas.
//!
//! ```text
//! apply_layout(name)
//!   reset container -> for each panel: hide | size -> measure -> clamp -> place
//!   -> layout_changed
//! ```

use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::Utc;
use serde::Serialize;

use super::positions::PanelPositionStore;
use super::registry::{BoxSize, DisplayMode, LayoutRegistry, LayoutSummary, PanelKey, Position};
use super::render::Renderer;
use crate::error::LayoutError;
use crate::events::Event;
use crate::storage::{load_json, save_json, KvStore};

pub const ACTIVE_LAYOUT_KEY: &str = "active_layout";

/// Ratio between stored base coordinates and canvas pixels.
///
/// The canvas has a fixed resolution, so this is 1:1. Every conversion
/// still goes through [`to_actual`] / [`to_base`].
pub const POSITION_SCALE: f64 = 1.0;

pub fn to_actual(base: Position) -> Position {
    Position::new(
        (base.left as f64 * POSITION_SCALE).round() as i32,
        (base.top as f64 * POSITION_SCALE).round() as i32,
    )
}

pub fn to_base(actual: Position) -> Position {
    Position::new(
        (actual.left as f64 / POSITION_SCALE).round() as i32,
        (actual.top as f64 / POSITION_SCALE).round() as i32,
    )
}

/// Clamp `left` into `[0, canvas.width - element.width]` and `top` into
/// `[0, canvas.height - element.height]`. An element larger than the canvas
/// is pinned to 0 on that axis.
pub fn clamp_to_canvas(position: Position, element: BoxSize, canvas: BoxSize) -> Position {
    let max_left = (i64::from(canvas.width) - i64::from(element.width)).max(0);
    let max_top = (i64::from(canvas.height) - i64::from(element.height)).max(0);
    Position::new(
        i64::from(position.left).clamp(0, max_left) as i32,
        i64::from(position.top).clamp(0, max_top) as i32,
    )
}

/// Where a visible panel ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub position: Position,
    pub size: BoxSize,
}

/// Serializable view of the current layout.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutScene {
    pub layout: Option<String>,
    pub canvas: BoxSize,
    pub panels: BTreeMap<PanelKey, Placement>,
}

/// A pointer-driven move in flight.
#[derive(Debug, Clone, Copy)]
struct DragSession {
    panel: PanelKey,
    origin: Position,
    pointer_start: Position,
}

pub struct LayoutEngine {
    registry: LayoutRegistry,
    positions: PanelPositionStore,
    renderer: Box<dyn Renderer>,
    store: Rc<dyn KvStore>,
    canvas: BoxSize,
    active: Option<String>,
    placements: BTreeMap<PanelKey, Placement>,
    drag: Option<DragSession>,
}

impl LayoutEngine {
    pub fn new(
        registry: LayoutRegistry,
        canvas: BoxSize,
        store: Rc<dyn KvStore>,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        Self {
            registry,
            positions: PanelPositionStore::load(store.clone()),
            renderer,
            store,
            canvas,
            active: None,
            placements: BTreeMap::new(),
            drag: None,
        }
    }

    /// Re-apply the persisted active layout, falling back to `default`.
    pub fn restore(&mut self, default: &str) -> Result<Event, LayoutError> {
        let saved: Option<String> = load_json(self.store.as_ref(), ACTIVE_LAYOUT_KEY);
        if let Some(saved) = saved {
            match self.apply_layout(&saved) {
                Ok(event) => return Ok(event),
                Err(e) => tracing::warn!(layout = %saved, error = %e, "stored layout no longer exists"),
            }
        }
        self.apply_layout(default)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn registry(&self) -> &LayoutRegistry {
        &self.registry
    }

    pub fn positions(&self) -> &PanelPositionStore {
        &self.positions
    }

    pub fn canvas(&self) -> BoxSize {
        self.canvas
    }

    pub fn active_layout(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn visible_panels(&self) -> Vec<PanelKey> {
        self.placements.keys().copied().collect()
    }

    pub fn placement(&self, panel: PanelKey) -> Option<Placement> {
        self.placements.get(&panel).copied()
    }

    pub fn available_layouts(&self) -> Vec<LayoutSummary> {
        self.registry.available()
    }

    pub fn scene(&self) -> LayoutScene {
        LayoutScene {
            layout: self.active.clone(),
            canvas: self.canvas,
            panels: self.placements.clone(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply the preset with internal key `name`.
    pub fn apply_layout(&mut self, name: &str) -> Result<Event, LayoutError> {
        let preset = self
            .registry
            .get(name)
            .cloned()
            .ok_or_else(|| LayoutError::UnknownLayout(name.to_string()))?;

        self.drag = None;
        self.placements.clear();
        self.renderer.reset_container(self.canvas, preset.padding);

        for panel in PanelKey::ALL {
            let Some(config) = preset.enabled_panel(panel) else {
                self.renderer.set_visible(panel, false, DisplayMode::default());
                continue;
            };
            self.renderer.set_visible(panel, true, config.display);

            let stored = self.positions.get(name, panel);
            let actual = to_actual(stored.unwrap_or(config.position));

            self.renderer.apply_size(panel, &config.size);
            let rendered = self.renderer.measure(panel);
            let clamped = clamp_to_canvas(actual, rendered, self.canvas);
            if clamped != actual {
                tracing::debug!(
                    layout = name,
                    %panel,
                    from = ?actual,
                    to = ?clamped,
                    "panel clamped to canvas"
                );
            }
            self.renderer.place(panel, clamped);

            let base = to_base(clamped);
            if stored.is_some_and(|s| s != base) {
                self.positions.set(name, panel, base);
            }
            self.placements.insert(
                panel,
                Placement {
                    position: clamped,
                    size: rendered,
                },
            );
        }

        self.active = Some(name.to_string());
        save_json(self.store.as_ref(), ACTIVE_LAYOUT_KEY, name);
        self.renderer.layout_changed(name);

        let visible = self.visible_panels();
        tracing::info!(layout = name, panels = visible.len(), "layout applied");
        Ok(Event::LayoutChanged {
            layout: name.to_string(),
            visible,
            at: Utc::now(),
        })
    }

    /// Store an override for (`layout`, `panel`). Always succeeds.
    pub fn save_panel_position(
        &mut self,
        layout: &str,
        panel: PanelKey,
        position: Position,
    ) -> Event {
        let base = to_base(position);
        self.positions.set(layout, panel, base);
        Event::PanelMoved {
            layout: layout.to_string(),
            panel,
            left: base.left,
            top: base.top,
            at: Utc::now(),
        }
    }

    /// Drop the override for `panel` in `layout`, then redraw if that layout
    /// is on screen. Returns whether an override existed.
    pub fn reset_panel_position(
        &mut self,
        panel: PanelKey,
        layout: &str,
    ) -> Result<bool, LayoutError> {
        self.ensure_known(layout)?;
        let removed = self.positions.remove(layout, panel);
        self.reapply_if_active(layout)?;
        Ok(removed)
    }

    /// Drop every override for `layout`. Returns how many were removed.
    pub fn reset_layout_positions(&mut self, layout: &str) -> Result<usize, LayoutError> {
        self.ensure_known(layout)?;
        let removed = self.positions.clear_layout(layout);
        self.reapply_if_active(layout)?;
        Ok(removed)
    }

    // ── Pointer interaction ──────────────────────────────────────────

    /// Start moving a visible panel. Refused while another drag is active.
    pub fn begin_drag(&mut self, panel: PanelKey, pointer: Position) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let Some(placement) = self.placements.get(&panel) else {
            return false;
        };
        self.drag = Some(DragSession {
            panel,
            origin: placement.position,
            pointer_start: pointer,
        });
        true
    }

    /// Follow the pointer. Returns the clamped position the panel moved to.
    pub fn drag_to(&mut self, pointer: Position) -> Option<Position> {
        let session = self.drag?;
        let placement = self.placements.get_mut(&session.panel)?;
        let target = Position::new(
            session
                .origin
                .left
                .saturating_add(pointer.left.saturating_sub(session.pointer_start.left)),
            session
                .origin
                .top
                .saturating_add(pointer.top.saturating_sub(session.pointer_start.top)),
        );
        let clamped = clamp_to_canvas(target, placement.size, self.canvas);
        placement.position = clamped;
        self.renderer.place(session.panel, clamped);
        Some(clamped)
    }

    /// Finish the drag wherever the pointer is, persisting the final position.
    pub fn end_drag(&mut self) -> Option<Event> {
        let session = self.drag.take()?;
        let layout = self.active.clone()?;
        let position = self.placements.get(&session.panel)?.position;
        Some(self.save_panel_position(&layout, session.panel, position))
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn ensure_known(&self, layout: &str) -> Result<(), LayoutError> {
        match self.registry.get(layout) {
            Some(_) => Ok(()),
            None => Err(LayoutError::UnknownLayout(layout.to_string())),
        }
    }

    fn reapply_if_active(&mut self, layout: &str) -> Result<(), LayoutError> {
        if self.active.as_deref() == Some(layout) {
            self.apply_layout(layout)?;
        }
        Ok(())
    }
}
