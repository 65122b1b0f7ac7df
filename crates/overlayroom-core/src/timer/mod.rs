mod engine;
mod session;

pub use engine::{
    format_clock, CompletionHook, PomodoroTimer, MAX_SESSIONS, MIN_SESSIONS, POMODORO_STATE_KEY,
};
pub use session::{
    Completion, CompletionKind, TimerMode, TimerSession, TimerSnapshot, TimerStatus,
};
