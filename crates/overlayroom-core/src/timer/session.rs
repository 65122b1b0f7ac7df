use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    #[default]
    Idle,
    Focus,
    Break,
    LongBreak,
}

impl TimerMode {
    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Idle => "Idle",
            TimerMode::Focus => "Focus",
            TimerMode::Break => "Break",
            TimerMode::LongBreak => "Long break",
        }
    }

    pub fn is_break(self) -> bool {
        matches!(self, TimerMode::Break | TimerMode::LongBreak)
    }
}

/// Coarse view of what the timer is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Stopped,
    /// A segment just finished; the next one starts after the completion window.
    Completing,
}

/// Full timer state.
///
/// Durations are minutes; `*_seconds` count the current segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSession {
    pub mode: TimerMode,
    pub total_seconds: u64,
    pub current_seconds: u64,
    pub current_session: u32,
    pub total_sessions: u32,
    pub focus_duration: u32,
    pub break_duration: u32,
    pub long_break_duration: u32,
    pub sessions_before_long_break: u32,
    pub is_paused: bool,
    pub is_running: bool,
}

/// What gets written to storage after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub current_seconds: u64,
    pub total_seconds: u64,
    pub is_running: bool,
    pub is_paused: bool,
    pub current_session: u32,
    pub total_sessions: u32,
    pub focus_duration: u32,
    pub break_duration: u32,
}

impl From<&TimerSession> for TimerSnapshot {
    fn from(s: &TimerSession) -> Self {
        Self {
            mode: s.mode,
            current_seconds: s.current_seconds,
            total_seconds: s.total_seconds,
            is_running: s.is_running,
            is_paused: s.is_paused,
            current_session: s.current_session,
            total_sessions: s.total_sessions,
            focus_duration: s.focus_duration,
            break_duration: s.break_duration,
        }
    }
}

impl TimerSnapshot {
    /// Only snapshots of a live segment are worth restoring.
    pub fn is_live(&self) -> bool {
        self.is_running || self.is_paused
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompletionKind {
    Focus,
    Break,
    LongBreak,
    CycleComplete,
}

/// Argument of the completion hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub kind: CompletionKind,
    pub session: u32,
    pub total_sessions: u32,
}

impl Completion {
    /// Chat-ready line for this completion.
    pub fn announcement(&self) -> String {
        let (n, total) = (self.session, self.total_sessions);
        match self.kind {
            CompletionKind::Focus if n >= total => {
                format!("Focus session {n}/{total} complete! That was the last one.")
            }
            CompletionKind::Focus => format!("Focus session {n}/{total} complete! Time for a break."),
            CompletionKind::Break => format!("Break over! Focus session {}/{total} is next.", n + 1),
            CompletionKind::LongBreak => {
                format!("Long break over! Focus session {}/{total} is next.", n + 1)
            }
            CompletionKind::CycleComplete => {
                format!("Pomodoro cycle complete! {total}/{total} sessions done.")
            }
        }
    }
}

pub(crate) fn completion_kind(mode: TimerMode) -> Option<CompletionKind> {
    match mode {
        TimerMode::Idle => None,
        TimerMode::Focus => Some(CompletionKind::Focus),
        TimerMode::Break => Some(CompletionKind::Break),
        TimerMode::LongBreak => Some(CompletionKind::LongBreak),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_uses_persisted_field_names() {
        let snapshot = TimerSnapshot {
            mode: TimerMode::LongBreak,
            current_seconds: 10,
            total_seconds: 900,
            is_running: true,
            is_paused: false,
            current_session: 4,
            total_sessions: 8,
            focus_duration: 25,
            break_duration: 5,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["mode"], "longBreak");
        assert_eq!(json["currentSeconds"], 10);
        assert_eq!(json["isRunning"], true);
        assert_eq!(json["totalSessions"], 8);
        assert_eq!(json["breakDuration"], 5);
    }

    #[test]
    fn announcement_mentions_progress() {
        let c = Completion {
            kind: CompletionKind::Focus,
            session: 1,
            total_sessions: 4,
        };
        assert_eq!(c.announcement(), "Focus session 1/4 complete! Time for a break.");
    }
}
