use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::layout::PanelKey;
use crate::timer::TimerMode;

/// Every state change in the overlay produces an Event.
/// The renderer redraws from them; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    LayoutChanged {
        layout: String,
        visible: Vec<PanelKey>,
        at: DateTime<Utc>,
    },
    PanelMoved {
        layout: String,
        panel: PanelKey,
        left: i32,
        top: i32,
        at: DateTime<Utc>,
    },
    ThemeChanged {
        theme: String,
        at: DateTime<Utc>,
    },
    TimerStarted {
        mode: TimerMode,
        session: u32,
        total_sessions: u32,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// A focus or break segment ran down to zero.
    SegmentCompleted {
        mode: TimerMode,
        session: u32,
        total_sessions: u32,
        at: DateTime<Utc>,
    },
    CycleCompleted {
        total_sessions: u32,
        at: DateTime<Utc>,
    },
}
