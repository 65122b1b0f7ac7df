//! Active overlay theme. Injecting the theme's CSS variables is the
//! renderer's job; this only tracks which theme is selected.

use std::rc::Rc;

use chrono::Utc;
use serde::Serialize;

use crate::events::Event;
use crate::layout::normalize_name;
use crate::storage::{load_json, save_json, KvStore};

pub const ACTIVE_THEME_KEY: &str = "active_theme";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub key: &'static str,
    pub display_name: &'static str,
}

const THEMES: &[Theme] = &[
    Theme { key: "default", display_name: "Default" },
    Theme { key: "dark", display_name: "Dark Mode" },
    Theme { key: "light", display_name: "Light Mode" },
    Theme { key: "neon", display_name: "Neon Nights" },
    Theme { key: "pastel", display_name: "Pastel Dream" },
    Theme { key: "retro", display_name: "Retro Terminal" },
];

pub struct ThemeBook {
    active: &'static Theme,
    store: Rc<dyn KvStore>,
}

impl ThemeBook {
    /// Restore the stored theme, else `default`, else the first theme.
    pub fn load(store: Rc<dyn KvStore>, default: &str) -> Self {
        let saved: Option<String> = load_json(store.as_ref(), ACTIVE_THEME_KEY);
        let active = saved
            .as_deref()
            .and_then(find)
            .or_else(|| Self::resolve(default))
            .unwrap_or(&THEMES[0]);
        Self { active, store }
    }

    pub fn all() -> &'static [Theme] {
        THEMES
    }

    /// Match by key or display name after normalisation.
    pub fn resolve(input: &str) -> Option<&'static Theme> {
        let wanted = normalize_name(input);
        if wanted.is_empty() {
            return None;
        }
        THEMES.iter().find(|t| {
            normalize_name(t.key) == wanted || normalize_name(t.display_name) == wanted
        })
    }

    pub fn active(&self) -> &'static Theme {
        self.active
    }

    pub fn set(&mut self, theme: &'static Theme) -> Event {
        self.active = theme;
        save_json(self.store.as_ref(), ACTIVE_THEME_KEY, theme.key);
        tracing::info!(theme = theme.key, "theme changed");
        Event::ThemeChanged {
            theme: theme.key.to_string(),
            at: Utc::now(),
        }
    }
}

fn find(key: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn resolve_accepts_display_names() {
        assert_eq!(ThemeBook::resolve("Neon Nights").unwrap().key, "neon");
        assert_eq!(ThemeBook::resolve("retro-terminal").unwrap().key, "retro");
        assert!(ThemeBook::resolve("sepia").is_none());
    }

    #[test]
    fn selection_survives_reload() {
        let store: Rc<dyn KvStore> = Rc::new(MemoryStore::new());
        let mut book = ThemeBook::load(store.clone(), "default");
        assert_eq!(book.active().key, "default");
        book.set(ThemeBook::resolve("dark").unwrap());
        assert_eq!(ThemeBook::load(store, "default").active().key, "dark");
    }
}
