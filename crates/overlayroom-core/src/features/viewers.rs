//! Per-viewer profile fields shown by the viewer-info panel.

use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{load_json, save_json, KvStore};

pub const VIEWERS_KEY: &str = "viewers";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerProfile {
    #[serde(default)]
    pub info: BTreeMap<String, String>,
    pub last_active: DateTime<Utc>,
    #[serde(default)]
    pub task_count: u32,
}

impl ViewerProfile {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            info: BTreeMap::new(),
            last_active: now,
            task_count: 0,
        }
    }
}

pub struct ViewerDirectory {
    profiles: BTreeMap<String, ViewerProfile>,
    store: Rc<dyn KvStore>,
}

impl ViewerDirectory {
    pub fn load(store: Rc<dyn KvStore>) -> Self {
        let profiles = load_json(store.as_ref(), VIEWERS_KEY).unwrap_or_default();
        Self { profiles, store }
    }

    pub fn get(&self, user: &str) -> Option<&ViewerProfile> {
        self.profiles.get(user)
    }

    /// Set one info field, creating the profile on first use.
    pub fn set_info(&mut self, user: &str, field: &str, value: &str, now: DateTime<Utc>) {
        let profile = self.touch_entry(user, now);
        profile.info.insert(field.to_string(), value.to_string());
        self.persist();
    }

    /// Count a task added by `user`.
    pub fn record_task(&mut self, user: &str, now: DateTime<Utc>) {
        let profile = self.touch_entry(user, now);
        profile.task_count = profile.task_count.saturating_add(1);
        self.persist();
    }

    pub fn total(&self) -> usize {
        self.profiles.len()
    }

    /// Viewers active within the last 24 hours of `now`.
    pub fn active_since_yesterday(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::hours(24);
        self.profiles
            .values()
            .filter(|p| p.last_active > cutoff)
            .count()
    }

    fn touch_entry(&mut self, user: &str, now: DateTime<Utc>) -> &mut ViewerProfile {
        let profile = self
            .profiles
            .entry(user.to_string())
            .or_insert_with(|| ViewerProfile::new(now));
        profile.last_active = now;
        profile
    }

    fn persist(&self) {
        save_json(self.store.as_ref(), VIEWERS_KEY, &self.profiles);
    }
}
