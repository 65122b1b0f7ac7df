mod engine;
mod positions;
mod registry;
mod render;

pub use engine::{
    clamp_to_canvas, to_actual, to_base, LayoutEngine, LayoutScene, Placement, ACTIVE_LAYOUT_KEY,
    POSITION_SCALE,
};
pub use positions::{PanelPositionStore, PositionMap, PANEL_POSITIONS_KEY};
pub use registry::{
    normalize_name, BoxSize, DisplayMode, LayoutPreset, LayoutRegistry, LayoutSummary, PanelKey,
    PanelPreset, PanelSize, Position,
};
pub use render::{HeadlessRenderer, PanelView, Renderer};
