//! Per-viewer backlog.
//!
//! Each user owns an independent list. Positions handed to chat are 1-based
//! indexes into the user's list in display order.

use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{load_json, save_json, KvStore};

pub const BACKLOG_KEY: &str = "backlog";

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 5;
pub const DEFAULT_PRIORITY: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogItem {
    pub id: u64,
    pub description: String,
    pub priority: u8,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

pub struct Backlog {
    lists: BTreeMap<String, Vec<BacklogItem>>,
    store: Rc<dyn KvStore>,
}

impl Backlog {
    pub fn load(store: Rc<dyn KvStore>) -> Self {
        let lists = load_json(store.as_ref(), BACKLOG_KEY).unwrap_or_default();
        Self { lists, store }
    }

    /// Display order: open items first, then higher priority, then oldest.
    pub fn items(&self, user: &str) -> Vec<&BacklogItem> {
        let mut items: Vec<&BacklogItem> = self
            .lists
            .get(user)
            .map(|list| list.iter().collect())
            .unwrap_or_default();
        items.sort_by(|a, b| {
            a.completed
                .cmp(&b.completed)
                .then(b.priority.cmp(&a.priority))
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        items
    }

    pub fn add(&mut self, user: &str, description: &str, priority: u8, now: DateTime<Utc>) -> BacklogItem {
        let list = self.lists.entry(user.to_string()).or_default();
        let id = list.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        let item = BacklogItem {
            id,
            description: description.to_string(),
            priority: priority.clamp(MIN_PRIORITY, MAX_PRIORITY),
            completed: false,
            created_at: now,
        };
        list.push(item.clone());
        self.persist();
        item
    }

    /// Flip completion of the item at 1-based `position`.
    pub fn toggle(&mut self, user: &str, position: usize) -> Option<BacklogItem> {
        let id = self.id_at(user, position)?;
        let item = self.lists.get_mut(user)?.iter_mut().find(|i| i.id == id)?;
        item.completed = !item.completed;
        let item = item.clone();
        self.persist();
        Some(item)
    }

    /// Remove the item at 1-based `position`.
    pub fn remove(&mut self, user: &str, position: usize) -> Option<BacklogItem> {
        let id = self.id_at(user, position)?;
        let list = self.lists.get_mut(user)?;
        let index = list.iter().position(|i| i.id == id)?;
        let item = list.remove(index);
        if list.is_empty() {
            self.lists.remove(user);
        }
        self.persist();
        Some(item)
    }

    pub fn clear_user(&mut self, user: &str) -> usize {
        let removed = self.lists.remove(user).map_or(0, |l| l.len());
        if removed > 0 {
            self.persist();
        }
        removed
    }

    pub fn clear_all(&mut self) -> usize {
        let removed = self.lists.values().map(Vec::len).sum();
        self.lists.clear();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    /// `(total, completed)` across every user.
    pub fn totals(&self) -> (usize, usize) {
        self.lists.values().flatten().fold((0, 0), |(total, done), item| {
            (total + 1, done + usize::from(item.completed))
        })
    }

    fn id_at(&self, user: &str, position: usize) -> Option<u64> {
        let index = position.checked_sub(1)?;
        self.items(user).get(index).map(|i| i.id)
    }

    fn persist(&self) {
        save_json(self.store.as_ref(), BACKLOG_KEY, &self.lists);
    }
}
