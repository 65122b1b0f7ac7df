//! Pomodoro state machine.
//!
//! Driven by a logical clock: the caller advances it with
//! [`PomodoroTimer::advance`], one tick per second. There is no internal
//! thread or wall-clock read.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Focus -> (Break | LongBreak) -> Focus -> ... -> Focus(last) -> Idle
//! ```
//!
//! When a segment reaches zero the clock stops, the completion hook fires,
//! and the next segment starts once the completion window has elapsed.
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = PomodoroTimer::new(&config.timer, store);
//! timer.start_cycle(25, 5, 4, None);
//! // Once per second:
//! let events = timer.advance(1);
//! ```

use std::rc::Rc;

use chrono::Utc;

use super::session::{
    completion_kind, Completion, CompletionKind, TimerMode, TimerSession, TimerSnapshot,
    TimerStatus,
};
use crate::events::Event;
use crate::storage::{load_json, remove_key, save_json, KvStore, TimerConfig};

pub const POMODORO_STATE_KEY: &str = "pomodoro_state";

pub const MIN_SESSIONS: u32 = 1;
pub const MAX_SESSIONS: u32 = 12;

pub type CompletionHook = Box<dyn FnMut(&Completion)>;

pub struct PomodoroTimer {
    session: TimerSession,
    completion_delay_secs: u64,
    /// Ticks left before the next segment starts; `Some` only between a
    /// completed segment and its successor.
    pending_advance: Option<u64>,
    on_complete: Option<CompletionHook>,
    store: Rc<dyn KvStore>,
}

impl PomodoroTimer {
    /// Idle timer using `config` for durations not given to `start_cycle`.
    pub fn new(config: &TimerConfig, store: Rc<dyn KvStore>) -> Self {
        Self {
            session: TimerSession {
                mode: TimerMode::Idle,
                total_seconds: 0,
                current_seconds: 0,
                current_session: 0,
                total_sessions: clamp_sessions(i64::from(config.sessions)),
                focus_duration: config.focus_minutes.max(1),
                break_duration: config.break_minutes.max(1),
                long_break_duration: config.long_break_minutes.max(1),
                sessions_before_long_break: config.sessions_before_long_break.max(1),
                is_paused: false,
                is_running: false,
            },
            completion_delay_secs: config.completion_delay_secs,
            pending_advance: None,
            on_complete: None,
            store,
        }
    }

    /// Build a timer and pick up a running or paused segment from storage.
    pub fn restore(config: &TimerConfig, store: Rc<dyn KvStore>) -> Self {
        let mut timer = Self::new(config, store);
        let snapshot: Option<TimerSnapshot> = load_json(timer.store.as_ref(), POMODORO_STATE_KEY);
        match snapshot {
            Some(snapshot) if snapshot.is_live() && snapshot.mode != TimerMode::Idle => {
                timer.adopt(&snapshot);
                tracing::info!(
                    mode = ?timer.session.mode,
                    remaining = timer.session.current_seconds,
                    running = timer.session.is_running,
                    "restored pomodoro snapshot"
                );
            }
            Some(_) => tracing::debug!("stored pomodoro snapshot is not live, starting idle"),
            None => {}
        }
        timer
    }

    /// Replace the hook that hears about completions in the current cycle.
    pub fn set_completion_hook(&mut self, hook: CompletionHook) {
        self.on_complete = Some(hook);
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Read-only copy of every field.
    pub fn state(&self) -> TimerSession {
        self.session.clone()
    }

    pub fn mode(&self) -> TimerMode {
        self.session.mode
    }

    pub fn status(&self) -> TimerStatus {
        if self.pending_advance.is_some() {
            TimerStatus::Completing
        } else if self.session.is_running {
            TimerStatus::Running
        } else if self.session.is_paused {
            TimerStatus::Paused
        } else if self.session.mode == TimerMode::Idle {
            TimerStatus::Idle
        } else {
            TimerStatus::Stopped
        }
    }

    /// One-line summary for chat.
    pub fn status_line(&self) -> String {
        let s = &self.session;
        if s.mode == TimerMode::Idle {
            return "Pomodoro timer is idle.".to_string();
        }
        let remaining = format_clock(s.current_seconds);
        let base = format!(
            "{} | {} left | session {}/{}",
            s.mode.label(),
            remaining,
            s.current_session,
            s.total_sessions
        );
        match self.status() {
            TimerStatus::Paused => format!("{base} (paused)"),
            TimerStatus::Stopped => format!("{base} (stopped)"),
            TimerStatus::Completing => format!("{base} (done, next segment starting)"),
            _ => base,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a new cycle. Inputs are clamped: durations to at least one
    /// minute, sessions to `1..=12`.
    pub fn start_cycle(
        &mut self,
        focus_minutes: i64,
        break_minutes: i64,
        sessions: i64,
        on_complete: Option<CompletionHook>,
    ) -> Event {
        self.pending_advance = None;
        self.session.is_running = false;
        self.session.is_paused = false;

        self.session.focus_duration = clamp_minutes(focus_minutes);
        self.session.break_duration = clamp_minutes(break_minutes);
        self.session.total_sessions = clamp_sessions(sessions);
        self.session.current_session = 0;
        self.on_complete = on_complete;

        tracing::info!(
            focus = self.session.focus_duration,
            brk = self.session.break_duration,
            sessions = self.session.total_sessions,
            "pomodoro cycle started"
        );
        self.start_focus()
    }

    /// Freeze the clock. Only while running.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.session.is_running {
            return None;
        }
        self.session.is_running = false;
        self.session.is_paused = true;
        self.persist();
        Some(Event::TimerPaused {
            remaining_secs: self.session.current_seconds,
            at: Utc::now(),
        })
    }

    /// Continue from the preserved remaining time. Only while paused.
    pub fn resume(&mut self) -> Option<Event> {
        if !self.session.is_paused || self.session.current_seconds == 0 {
            return None;
        }
        self.session.is_paused = false;
        self.session.is_running = true;
        self.persist();
        Some(Event::TimerResumed {
            remaining_secs: self.session.current_seconds,
            at: Utc::now(),
        })
    }

    /// Cancel the clock but keep session progress.
    pub fn stop(&mut self) -> Option<Event> {
        if self.session.mode == TimerMode::Idle {
            return None;
        }
        self.pending_advance = None;
        self.session.is_running = false;
        self.session.is_paused = false;
        self.persist();
        Some(Event::TimerStopped {
            remaining_secs: self.session.current_seconds,
            at: Utc::now(),
        })
    }

    /// Back to idle with zeroed counters; the stored snapshot is cleared.
    pub fn reset(&mut self) -> Event {
        self.pending_advance = None;
        self.on_complete = None;
        self.clear_progress();
        remove_key(self.store.as_ref(), POMODORO_STATE_KEY);
        Event::TimerReset { at: Utc::now() }
    }

    /// Move the logical clock forward by `delta_secs` ticks.
    pub fn advance(&mut self, delta_secs: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..delta_secs {
            self.tick(&mut events);
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn tick(&mut self, events: &mut Vec<Event>) {
        if let Some(left) = self.pending_advance {
            if left <= 1 {
                self.pending_advance = None;
                self.start_next_segment(events);
            } else {
                self.pending_advance = Some(left - 1);
            }
            return;
        }

        if !self.session.is_running {
            return;
        }
        self.session.current_seconds = self.session.current_seconds.saturating_sub(1);
        if self.session.current_seconds == 0 {
            self.complete_segment(events);
        } else {
            self.persist();
        }
    }

    fn complete_segment(&mut self, events: &mut Vec<Event>) {
        self.session.is_running = false;
        let mode = self.session.mode;
        let Some(kind) = completion_kind(mode) else {
            return;
        };

        tracing::info!(
            ?mode,
            session = self.session.current_session,
            total = self.session.total_sessions,
            "pomodoro segment complete"
        );
        self.notify(Completion {
            kind,
            session: self.session.current_session,
            total_sessions: self.session.total_sessions,
        });
        events.push(Event::SegmentCompleted {
            mode,
            session: self.session.current_session,
            total_sessions: self.session.total_sessions,
            at: Utc::now(),
        });
        self.persist();

        if self.completion_delay_secs == 0 {
            self.start_next_segment(events);
        } else {
            self.pending_advance = Some(self.completion_delay_secs);
        }
    }

    fn start_next_segment(&mut self, events: &mut Vec<Event>) {
        let last = self.session.current_session >= self.session.total_sessions;
        match self.session.mode {
            TimerMode::Idle => {}
            _ if last => self.finish_cycle(events),
            TimerMode::Focus => events.push(self.start_break()),
            TimerMode::Break | TimerMode::LongBreak => events.push(self.start_focus()),
        }
    }

    fn start_focus(&mut self) -> Event {
        self.session.current_session += 1;
        let minutes = self.session.focus_duration;
        self.begin_segment(TimerMode::Focus, minutes)
    }

    fn start_break(&mut self) -> Event {
        let every = self.session.sessions_before_long_break.max(1);
        if self.session.current_session % every == 0 {
            let minutes = self.session.long_break_duration;
            self.begin_segment(TimerMode::LongBreak, minutes)
        } else {
            let minutes = self.session.break_duration;
            self.begin_segment(TimerMode::Break, minutes)
        }
    }

    fn begin_segment(&mut self, mode: TimerMode, minutes: u32) -> Event {
        let secs = u64::from(minutes).saturating_mul(60);
        self.session.mode = mode;
        self.session.total_seconds = secs;
        self.session.current_seconds = secs;
        self.session.is_paused = false;
        self.session.is_running = true;
        self.persist();
        Event::TimerStarted {
            mode,
            session: self.session.current_session,
            total_sessions: self.session.total_sessions,
            duration_secs: secs,
            at: Utc::now(),
        }
    }

    fn finish_cycle(&mut self, events: &mut Vec<Event>) {
        let total = self.session.total_sessions;
        self.clear_progress();
        remove_key(self.store.as_ref(), POMODORO_STATE_KEY);

        tracing::info!(sessions = total, "pomodoro cycle complete");
        self.notify(Completion {
            kind: CompletionKind::CycleComplete,
            session: total,
            total_sessions: total,
        });
        self.on_complete = None;
        events.push(Event::CycleCompleted {
            total_sessions: total,
            at: Utc::now(),
        });
    }

    fn clear_progress(&mut self) {
        self.session.mode = TimerMode::Idle;
        self.session.current_seconds = 0;
        self.session.total_seconds = 0;
        self.session.current_session = 0;
        self.session.is_running = false;
        self.session.is_paused = false;
    }

    fn notify(&mut self, completion: Completion) {
        if let Some(hook) = self.on_complete.as_mut() {
            hook(&completion);
        }
    }

    fn adopt(&mut self, snapshot: &TimerSnapshot) {
        let s = &mut self.session;
        s.mode = snapshot.mode;
        s.total_sessions = clamp_sessions(i64::from(snapshot.total_sessions));
        s.current_session = snapshot.current_session.min(s.total_sessions);
        s.focus_duration = snapshot.focus_duration.max(1);
        s.break_duration = snapshot.break_duration.max(1);
        s.total_seconds = snapshot.total_seconds;
        s.current_seconds = snapshot.current_seconds.min(snapshot.total_seconds);
        // A snapshot claiming both keeps the safer paused state.
        s.is_paused = snapshot.is_paused;
        s.is_running = snapshot.is_running && !snapshot.is_paused;
    }

    fn persist(&self) {
        save_json(
            self.store.as_ref(),
            POMODORO_STATE_KEY,
            &TimerSnapshot::from(&self.session),
        );
    }
}

fn clamp_minutes(minutes: i64) -> u32 {
    minutes.clamp(1, i64::from(u32::MAX)) as u32
}

fn clamp_sessions(sessions: i64) -> u32 {
    sessions.clamp(i64::from(MIN_SESSIONS), i64::from(MAX_SESSIONS)) as u32
}

/// `mm:ss`, with minutes growing past 59 as needed.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::cell::RefCell;

    fn config(delay: u64) -> TimerConfig {
        TimerConfig {
            completion_delay_secs: delay,
            ..TimerConfig::default()
        }
    }

    fn timer(delay: u64) -> PomodoroTimer {
        PomodoroTimer::new(&config(delay), Rc::new(MemoryStore::new()))
    }

    fn recorder() -> (Rc<RefCell<Vec<Completion>>>, CompletionHook) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, Box::new(move |c: &Completion| sink.borrow_mut().push(*c)))
    }

    #[test]
    fn start_cycle_enters_first_focus() {
        let mut t = timer(2);
        let event = t.start_cycle(25, 5, 4, None);
        assert!(matches!(
            event,
            Event::TimerStarted { mode: TimerMode::Focus, session: 1, duration_secs: 1500, .. }
        ));
        let s = t.state();
        assert_eq!(s.current_session, 1);
        assert_eq!(s.current_seconds, 1500);
        assert!(s.is_running && !s.is_paused);
    }

    #[test]
    fn inputs_are_clamped() {
        let mut t = timer(2);
        t.start_cycle(0, -3, 99, None);
        let s = t.state();
        assert_eq!((s.focus_duration, s.break_duration, s.total_sessions), (1, 1, 12));
        t.start_cycle(10, 10, 0, None);
        assert_eq!(t.state().total_sessions, 1);
    }

    #[test]
    fn completion_waits_for_window_then_breaks() {
        let (seen, hook) = recorder();
        let mut t = timer(2);
        t.start_cycle(1, 1, 2, Some(hook));

        t.advance(60);
        assert_eq!(t.status(), TimerStatus::Completing);
        assert_eq!(seen.borrow()[0].kind, CompletionKind::Focus);
        assert_eq!(t.mode(), TimerMode::Focus);

        t.advance(1);
        assert_eq!(t.mode(), TimerMode::Focus);
        t.advance(1);
        assert_eq!(t.mode(), TimerMode::Break);
        assert_eq!(t.status(), TimerStatus::Running);
        assert_eq!(t.state().current_seconds, 60);
    }

    #[test]
    fn pause_resume_preserves_progress() {
        let mut t = timer(2);
        t.start_cycle(5, 5, 4, None);
        t.advance(17);
        let before = t.state();

        assert!(t.pause().is_some());
        assert!(t.pause().is_none());
        t.advance(30);
        assert_eq!(t.state().current_seconds, before.current_seconds);

        assert!(t.resume().is_some());
        let after = t.state();
        assert_eq!(after.current_seconds, before.current_seconds);
        assert_eq!(after.current_session, before.current_session);
        assert!(after.is_running && !after.is_paused);
    }

    #[test]
    fn resume_without_pause_is_ignored() {
        let mut t = timer(2);
        assert!(t.resume().is_none());
        t.start_cycle(5, 5, 4, None);
        assert!(t.resume().is_none());
    }

    #[test]
    fn stop_keeps_counters_and_cancels_pending_advance() {
        let mut t = timer(3);
        t.start_cycle(1, 1, 3, None);
        t.advance(60);
        assert_eq!(t.status(), TimerStatus::Completing);

        assert!(t.stop().is_some());
        t.advance(10);
        let s = t.state();
        assert_eq!(t.status(), TimerStatus::Stopped);
        assert_eq!(s.mode, TimerMode::Focus);
        assert_eq!(s.current_session, 1);
    }

    #[test]
    fn reset_zeroes_and_clears_snapshot() {
        let store: Rc<dyn KvStore> = Rc::new(MemoryStore::new());
        let mut t = PomodoroTimer::new(&config(2), store.clone());
        t.start_cycle(5, 5, 4, None);
        assert!(store.get(POMODORO_STATE_KEY).unwrap().is_some());

        t.reset();
        let s = t.state();
        assert_eq!((s.current_seconds, s.total_seconds, s.current_session), (0, 0, 0));
        assert_eq!(t.status(), TimerStatus::Idle);
        assert!(store.get(POMODORO_STATE_KEY).unwrap().is_none());
    }

    #[test]
    fn zero_delay_advances_on_the_same_tick() {
        let mut t = timer(0);
        t.start_cycle(1, 1, 2, None);
        let events = t.advance(60);
        assert_eq!(events.len(), 2);
        assert_eq!(t.mode(), TimerMode::Break);
    }

    #[test]
    fn restored_segment_reports_through_new_hook() {
        let store: Rc<dyn KvStore> = Rc::new(MemoryStore::new());
        let mut first = PomodoroTimer::new(&config(2), store.clone());
        first.start_cycle(1, 1, 2, None);
        first.advance(30);
        drop(first);

        let (seen, hook) = recorder();
        let mut restored = PomodoroTimer::restore(&config(2), store);
        restored.set_completion_hook(hook);
        restored.advance(30);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].kind, CompletionKind::Focus);
    }

    #[test]
    fn status_line_formats_remaining_time() {
        let mut t = timer(2);
        assert_eq!(t.status_line(), "Pomodoro timer is idle.");
        t.start_cycle(25, 5, 4, None);
        t.advance(65);
        assert_eq!(t.status_line(), "Focus | 23:55 left | session 1/4");
        t.pause();
        assert!(t.status_line().ends_with("(paused)"));
    }
}
