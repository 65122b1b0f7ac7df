//! Presentation seam for the layout engine.
//!
//! The engine decides what goes where; a [`Renderer`] only draws it and
//! reports back the size a panel actually ended up with.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;

use super::registry::{BoxSize, DisplayMode, PanelKey, PanelSize, Position};

pub trait Renderer {
    /// Reset the canvas container to full-bleed fixed positioning.
    fn reset_container(&mut self, canvas: BoxSize, padding: u32);

    fn set_visible(&mut self, panel: PanelKey, visible: bool, display: DisplayMode);

    fn apply_size(&mut self, panel: PanelKey, size: &PanelSize);

    /// Rendered box of `panel` after its size was applied.
    fn measure(&self, panel: PanelKey) -> BoxSize;

    fn place(&mut self, panel: PanelKey, position: Position);

    /// Called once a layout has been fully applied.
    fn layout_changed(&mut self, _layout: &str) {}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PanelView {
    pub visible: bool,
    pub display: DisplayMode,
    pub position: Position,
    pub size: BoxSize,
}

/// In-process renderer with no presentation surface.
///
/// Clones share state, so a caller can keep one handle to inspect what the
/// engine drew through another. Content that overflows a panel can be
/// simulated with [`HeadlessRenderer::with_content_size`]; the measured box
/// is then the larger of the declared and the content size.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    state: Rc<RefCell<HeadlessState>>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    canvas: BoxSize,
    padding: u32,
    panels: BTreeMap<PanelKey, PanelView>,
    content: BTreeMap<PanelKey, BoxSize>,
    layout_changes: u32,
    last_layout: Option<String>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_size(self, panel: PanelKey, size: BoxSize) -> Self {
        self.state.borrow_mut().content.insert(panel, size);
        self
    }

    pub fn view(&self, panel: PanelKey) -> Option<PanelView> {
        self.state.borrow().panels.get(&panel).cloned()
    }

    /// Number of completed layout applications.
    pub fn layout_changes(&self) -> u32 {
        self.state.borrow().layout_changes
    }

    pub fn last_layout(&self) -> Option<String> {
        self.state.borrow().last_layout.clone()
    }

    /// Canvas and padding from the last container reset.
    pub fn container(&self) -> (BoxSize, u32) {
        let state = self.state.borrow();
        (state.canvas, state.padding)
    }
}

impl Renderer for HeadlessRenderer {
    fn reset_container(&mut self, canvas: BoxSize, padding: u32) {
        let mut state = self.state.borrow_mut();
        state.canvas = canvas;
        state.padding = padding;
    }

    fn set_visible(&mut self, panel: PanelKey, visible: bool, display: DisplayMode) {
        let mut state = self.state.borrow_mut();
        let view = state.panels.entry(panel).or_default();
        view.visible = visible;
        view.display = display;
    }

    fn apply_size(&mut self, panel: PanelKey, size: &PanelSize) {
        self.state.borrow_mut().panels.entry(panel).or_default().size = size.effective();
    }

    fn measure(&self, panel: PanelKey) -> BoxSize {
        let state = self.state.borrow();
        let declared = state.panels.get(&panel).map(|v| v.size).unwrap_or_default();
        match state.content.get(&panel) {
            Some(content) => BoxSize::new(
                declared.width.max(content.width),
                declared.height.max(content.height),
            ),
            None => declared,
        }
    }

    fn place(&mut self, panel: PanelKey, position: Position) {
        self.state.borrow_mut().panels.entry(panel).or_default().position = position;
    }

    fn layout_changed(&mut self, layout: &str) {
        let mut state = self.state.borrow_mut();
        state.layout_changes += 1;
        state.last_layout = Some(layout.to_string());
    }
}
