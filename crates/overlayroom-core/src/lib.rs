//! # Overlayroom Core Library
//!
//! Core logic for a chat-driven stream overlay. A streaming page renders the
//! panels; this crate decides where they go, runs the pomodoro clock and
//! turns chat commands into state changes.
//!
//! ## Architecture
//!
//! - **Layout**: named presets, per-layout panel position overrides and the
//!   apply algorithm that sizes, measures and clamps panels to the canvas
//! - **Timer**: a pomodoro state machine driven by a logical clock; the
//!   caller advances it, usually once per second
//! - **Commands**: a static command table with a moderator permission gate
//! - **Storage**: a small key-value store (SQLite or in-memory) and
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`OverlayContext`]: every component, built once at startup
//! - [`CommandRouter`]: dispatches [`CommandEvent`]s against the context
//! - [`LayoutEngine`]: applies layouts through a [`layout::Renderer`]
//! - [`PomodoroTimer`]: focus/break cycles with completion callbacks

pub mod commands;
pub mod context;
pub mod error;
pub mod events;
pub mod features;
pub mod layout;
pub mod permission;
pub mod storage;
pub mod timer;

pub use commands::{ChatSink, CommandEvent, CommandRouter, Dispatch, EventExtra, Reply};
pub use context::OverlayContext;
pub use error::{ConfigError, CoreError, LayoutError, StorageError};
pub use events::Event;
pub use layout::{HeadlessRenderer, LayoutEngine, LayoutRegistry, PanelKey, Position};
pub use permission::{Permission, Role, UserFlags};
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use timer::{Completion, PomodoroTimer, TimerMode, TimerSession, TimerStatus};
