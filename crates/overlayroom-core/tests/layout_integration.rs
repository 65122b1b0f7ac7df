//! Integration tests for layout presets and panel position overrides.

use std::rc::Rc;

use overlayroom_core::layout::{BoxSize, HeadlessRenderer, LayoutEngine, LayoutRegistry, PanelKey, Position};
use overlayroom_core::storage::{Database, KvStore, MemoryStore};

fn engine(store: Rc<dyn KvStore>) -> LayoutEngine {
    LayoutEngine::new(
        LayoutRegistry::builtin(),
        BoxSize::new(1920, 1080),
        store,
        Box::new(HeadlessRenderer::new()),
    )
}

#[test]
fn visible_panels_match_enabled_panels_for_every_preset() {
    let mut engine = engine(Rc::new(MemoryStore::new()));
    let presets = engine.registry().presets().to_vec();
    for preset in presets {
        engine.apply_layout(&preset.name).unwrap();
        assert_eq!(
            engine.visible_panels(),
            preset.enabled_panels(),
            "visible set differs for {}",
            preset.name
        );
        for panel in PanelKey::ALL {
            assert_eq!(engine.placement(panel).is_some(), preset.enabled_panel(panel).is_some());
        }
    }
}

#[test]
fn renderer_sees_hidden_panels_padding_and_change_notifications() {
    let renderer = HeadlessRenderer::new();
    let mut engine = LayoutEngine::new(
        LayoutRegistry::builtin(),
        BoxSize::new(1920, 1080),
        Rc::new(MemoryStore::new()),
        Box::new(renderer.clone()),
    );

    engine.apply_layout("full").unwrap();
    assert_eq!(renderer.layout_changes(), 1);
    assert!(renderer.view(PanelKey::Timer).unwrap().visible);

    engine.apply_layout("community").unwrap();
    assert_eq!(renderer.layout_changes(), 2);
    assert_eq!(renderer.last_layout().as_deref(), Some("community"));
    assert_eq!(renderer.container(), (BoxSize::new(1920, 1080), 20));
    assert!(!renderer.view(PanelKey::Timer).unwrap().visible);

    let viewer_info = renderer.view(PanelKey::ViewerInfo).unwrap();
    assert!(viewer_info.visible);
    assert_eq!(
        viewer_info.position,
        engine.placement(PanelKey::ViewerInfo).unwrap().position
    );
}

#[test]
fn community_keeps_disabled_timer_hidden() {
    let mut engine = engine(Rc::new(MemoryStore::new()));
    engine.apply_layout("community").unwrap();
    assert!(engine.placement(PanelKey::Timer).is_none());
    assert!(engine.placement(PanelKey::ViewerInfo).is_some());
}

#[test]
fn every_placement_is_on_canvas() {
    let mut engine = engine(Rc::new(MemoryStore::new()));
    for name in ["full", "compact", "split", "focus", "community"] {
        engine.apply_layout(name).unwrap();
        for (_, placement) in engine.scene().panels {
            let p = placement.position;
            assert!(p.left >= 0 && p.top >= 0);
            assert!(p.left as u32 + placement.size.width <= 1920);
            assert!(p.top as u32 + placement.size.height <= 1080);
        }
    }
}

#[test]
fn override_is_scoped_to_its_layout() {
    let mut engine = engine(Rc::new(MemoryStore::new()));
    engine.apply_layout("compact").unwrap();
    engine.save_panel_position("compact", PanelKey::Timer, Position::new(600, 300));

    engine.apply_layout("split").unwrap();
    assert_eq!(
        engine.placement(PanelKey::Timer).unwrap().position,
        Position::new(1280, 40)
    );

    engine.apply_layout("compact").unwrap();
    assert_eq!(
        engine.placement(PanelKey::Timer).unwrap().position,
        Position::new(600, 300)
    );
}

#[test]
fn reset_panel_only_touches_that_panel() {
    let mut engine = engine(Rc::new(MemoryStore::new()));
    engine.apply_layout("full").unwrap();
    engine.save_panel_position("full", PanelKey::Timer, Position::new(900, 100));
    engine.save_panel_position("full", PanelKey::Tasks, Position::new(300, 100));

    assert!(engine.reset_panel_position(PanelKey::Timer, "full").unwrap());
    assert_eq!(
        engine.placement(PanelKey::Timer).unwrap().position,
        Position::new(1480, 20)
    );
    assert_eq!(
        engine.placement(PanelKey::Tasks).unwrap().position,
        Position::new(300, 100)
    );
    assert!(!engine.reset_panel_position(PanelKey::Timer, "full").unwrap());
}

#[test]
fn resetting_an_inactive_layout_leaves_the_screen_alone() {
    let mut engine = engine(Rc::new(MemoryStore::new()));
    engine.save_panel_position("split", PanelKey::Timer, Position::new(10, 10));
    engine.apply_layout("focus").unwrap();
    let before = engine.scene().panels;

    assert_eq!(engine.reset_layout_positions("split").unwrap(), 1);
    assert_eq!(engine.scene().panels, before);
    assert!(engine.positions().for_layout("split").is_none());
    assert!(engine.reset_layout_positions("nowhere").is_err());
}

#[test]
fn overrides_and_active_layout_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overlay.db");

    {
        let store: Rc<dyn KvStore> = Rc::new(Database::open_at(&path).unwrap());
        let mut engine = engine(store);
        engine.apply_layout("split").unwrap();
        engine.save_panel_position("split", PanelKey::Backlog, Position::new(700, 200));
    }

    let store: Rc<dyn KvStore> = Rc::new(Database::open_at(&path).unwrap());
    let mut engine = engine(store);
    engine.restore("full").unwrap();
    assert_eq!(engine.active_layout(), Some("split"));
    assert_eq!(
        engine.placement(PanelKey::Backlog).unwrap().position,
        Position::new(700, 200)
    );
}

#[test]
fn drag_persists_final_position() {
    let mut engine = engine(Rc::new(MemoryStore::new()));
    engine.apply_layout("focus").unwrap();

    assert!(engine.begin_drag(PanelKey::Timer, Position::new(800, 500)));
    engine.drag_to(Position::new(850, 520));
    let event = engine.end_drag();
    assert!(event.is_some());
    assert!(!engine.is_dragging());
    assert_eq!(
        engine.positions().get("focus", PanelKey::Timer),
        Some(Position::new(760, 410))
    );
}
