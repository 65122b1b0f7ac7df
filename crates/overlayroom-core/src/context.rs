//! The one place overlay state lives.
//!
//! Built once at startup and handed by `&mut` to the command router and
//! its handlers.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::Result;
use crate::events::Event;
use crate::features::{Backlog, ThemeBook, ViewerDirectory};
use crate::layout::{BoxSize, LayoutEngine, LayoutRegistry, Renderer};
use crate::storage::{Config, KvStore};
use crate::timer::{Completion, CompletionHook, PomodoroTimer};

pub struct OverlayContext {
    pub config: Config,
    pub layout: LayoutEngine,
    pub timer: PomodoroTimer,
    pub themes: ThemeBook,
    pub backlog: Backlog,
    pub viewers: ViewerDirectory,
    completions: Rc<RefCell<VecDeque<Completion>>>,
}

impl OverlayContext {
    /// Load every component from `store` and bring the canvas up with the
    /// stored (or configured default) layout.
    ///
    /// # Errors
    /// Fails only if configured layout presets clash with built-in keys.
    pub fn new(config: Config, store: Rc<dyn KvStore>, renderer: Box<dyn Renderer>) -> Result<Self> {
        let registry = LayoutRegistry::with_extra(config.layouts.clone())?;
        let canvas = BoxSize::new(config.canvas.width, config.canvas.height);
        let mut layout = LayoutEngine::new(registry, canvas, store.clone(), renderer);
        if let Err(e) = layout.restore(&config.default_layout) {
            tracing::warn!(error = %e, "default layout unavailable, using full overlay");
            layout.apply_layout("full")?;
        }

        let mut ctx = Self {
            timer: PomodoroTimer::restore(&config.timer, store.clone()),
            themes: ThemeBook::load(store.clone(), &config.default_theme),
            backlog: Backlog::load(store.clone()),
            viewers: ViewerDirectory::load(store),
            layout,
            config,
            completions: Rc::new(RefCell::new(VecDeque::new())),
        };
        // A restored segment still has to announce its completion.
        let hook = ctx.completion_hook();
        ctx.timer.set_completion_hook(hook);
        Ok(ctx)
    }

    /// Hook that queues completions for [`Self::drain_completions`].
    pub fn completion_hook(&self) -> CompletionHook {
        let queue = Rc::clone(&self.completions);
        Box::new(move |c: &Completion| queue.borrow_mut().push_back(*c))
    }

    /// Completions reported by the timer since the last drain, oldest first.
    pub fn drain_completions(&self) -> Vec<Completion> {
        self.completions.borrow_mut().drain(..).collect()
    }

    /// Advance the logical clock.
    pub fn tick(&mut self, delta_secs: u64) -> Vec<Event> {
        self.timer.advance(delta_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::HeadlessRenderer;
    use crate::storage::{MemoryStore, UnavailableStore};

    #[test]
    fn starts_on_configured_default_layout() {
        let config = Config {
            default_layout: "focus".into(),
            ..Config::default()
        };
        let ctx = OverlayContext::new(
            config,
            Rc::new(MemoryStore::new()),
            Box::new(HeadlessRenderer::new()),
        )
        .unwrap();
        assert_eq!(ctx.layout.active_layout(), Some("focus"));
    }

    #[test]
    fn unknown_default_falls_back_to_full() {
        let config = Config {
            default_layout: "nowhere".into(),
            ..Config::default()
        };
        let ctx = OverlayContext::new(
            config,
            Rc::new(MemoryStore::new()),
            Box::new(HeadlessRenderer::new()),
        )
        .unwrap();
        assert_eq!(ctx.layout.active_layout(), Some("full"));
    }

    #[test]
    fn unavailable_storage_still_boots() {
        let ctx = OverlayContext::new(
            Config::default(),
            Rc::new(UnavailableStore),
            Box::new(HeadlessRenderer::new()),
        )
        .unwrap();
        assert_eq!(ctx.layout.active_layout(), Some("full"));
        assert_eq!(ctx.themes.active().key, "default");
    }

    #[test]
    fn completions_queue_through_hook() {
        let mut ctx = OverlayContext::new(
            Config::default(),
            Rc::new(MemoryStore::new()),
            Box::new(HeadlessRenderer::new()),
        )
        .unwrap();
        let hook = ctx.completion_hook();
        ctx.timer.start_cycle(1, 1, 1, Some(hook));
        ctx.tick(60 + 2);
        let seen = ctx.drain_completions();
        assert_eq!(seen.len(), 2);
        assert!(ctx.drain_completions().is_empty());
    }
}
