//! Privilege classification for chat command invokers.

use serde::{Deserialize, Serialize};

/// Flags the chat transport attaches to every command event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFlags {
    pub broadcaster: bool,
    #[serde(rename = "mod")]
    pub moderator: bool,
    pub subscriber: bool,
    pub vip: bool,
    pub founder: bool,
}

impl UserFlags {
    pub fn broadcaster() -> Self {
        Self {
            broadcaster: true,
            ..Self::default()
        }
    }

    pub fn moderator() -> Self {
        Self {
            moderator: true,
            ..Self::default()
        }
    }

    pub fn viewer() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Mod,
}

impl Role {
    /// Broadcaster and moderators are `Mod`; everyone else is a `Viewer`.
    pub fn classify(flags: &UserFlags) -> Self {
        if flags.broadcaster || flags.moderator {
            Role::Mod
        } else {
            Role::Viewer
        }
    }
}

/// Requirement a command places on its invoker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ModOnly,
    Open,
}

impl Permission {
    pub fn allows(self, role: Role) -> bool {
        match self {
            Permission::Open => true,
            Permission::ModOnly => role == Role::Mod,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcaster_and_mod_classify_as_mod() {
        assert_eq!(Role::classify(&UserFlags::broadcaster()), Role::Mod);
        assert_eq!(Role::classify(&UserFlags::moderator()), Role::Mod);
    }

    #[test]
    fn vip_and_subscriber_are_still_viewers() {
        let flags = UserFlags {
            vip: true,
            subscriber: true,
            founder: true,
            ..UserFlags::default()
        };
        assert_eq!(Role::classify(&flags), Role::Viewer);
    }

    #[test]
    fn mod_only_rejects_viewers() {
        assert!(!Permission::ModOnly.allows(Role::Viewer));
        assert!(Permission::ModOnly.allows(Role::Mod));
        assert!(Permission::Open.allows(Role::Viewer));
    }

    #[test]
    fn flags_deserialize_from_transport_shape() {
        let flags: UserFlags = serde_json::from_str(r#"{"mod": true, "vip": false}"#).unwrap();
        assert!(flags.moderator);
        assert!(!flags.broadcaster);
    }
}
