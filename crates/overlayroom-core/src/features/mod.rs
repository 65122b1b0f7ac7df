//! Feature modules the command router dispatches to besides layout and timer.

pub mod backlog;
pub mod themes;
pub mod viewers;

pub use backlog::{Backlog, BacklogItem, DEFAULT_PRIORITY};
pub use themes::{Theme, ThemeBook};
pub use viewers::{ViewerDirectory, ViewerProfile};

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub total_viewers: usize,
    pub active_viewers_24h: usize,
    pub total_backlog_items: usize,
    pub completed_backlog_items: usize,
    /// Percent, one decimal place. Zero when there are no items.
    pub completion_rate: f64,
}

impl StatsSummary {
    pub fn collect(viewers: &ViewerDirectory, backlog: &Backlog, now: DateTime<Utc>) -> Self {
        let (total, completed) = backlog.totals();
        let completion_rate = if total > 0 {
            (completed as f64 / total as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };
        Self {
            total_viewers: viewers.total(),
            active_viewers_24h: viewers.active_since_yesterday(now),
            total_backlog_items: total,
            completed_backlog_items: completed,
            completion_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KvStore, MemoryStore};
    use std::rc::Rc;

    #[test]
    fn completion_rate_rounds_to_one_decimal() {
        let store: Rc<dyn KvStore> = Rc::new(MemoryStore::new());
        let mut backlog = Backlog::load(store.clone());
        let viewers = ViewerDirectory::load(store);
        let now = Utc::now();
        for d in ["a", "b", "c"] {
            backlog.add("ana", d, DEFAULT_PRIORITY, now);
        }
        backlog.toggle("ana", 1);

        let stats = StatsSummary::collect(&viewers, &backlog, now);
        assert_eq!(stats.total_backlog_items, 3);
        assert_eq!(stats.completion_rate, 33.3);
    }

    #[test]
    fn empty_backlog_has_zero_rate() {
        let store: Rc<dyn KvStore> = Rc::new(MemoryStore::new());
        let stats = StatsSummary::collect(
            &ViewerDirectory::load(store.clone()),
            &Backlog::load(store),
            Utc::now(),
        );
        assert_eq!(stats.completion_rate, 0.0);
    }
}
