//! Chat command dispatch.
//!
//! The chat transport hands over already-parsed [`CommandEvent`]s. The
//! [`CommandRouter`] looks the command up, checks the invoker's role and
//! runs the handler against the [`crate::OverlayContext`].

mod handlers;
mod router;

pub use router::{CommandRouter, CommandEntry, Invocation, COMMANDS};

use serde::{Deserialize, Serialize};

use crate::permission::UserFlags;

/// Transport metadata attached to a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventExtra {
    pub message_id: Option<String>,
    pub display_name: Option<String>,
    pub channel: Option<String>,
}

/// An authenticated, parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEvent {
    pub user: String,
    /// Command name, with or without the chat prefix.
    pub command: String,
    /// Full chat message or just the argument text.
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub flags: UserFlags,
    #[serde(default)]
    pub extra: EventExtra,
}

impl CommandEvent {
    pub fn new(user: &str, command: &str, message: &str, flags: UserFlags) -> Self {
        Self {
            user: user.to_string(),
            command: command.to_string(),
            message: message.to_string(),
            flags,
            extra: EventExtra::default(),
        }
    }

    pub fn with_message_id(mut self, id: &str) -> Self {
        self.extra.message_id = Some(id.to_string());
        self
    }

    /// Argument text: `message` minus a leading copy of the command token.
    pub fn argument_text(&self, prefix: &str) -> &str {
        let message = self.message.trim();
        let bare = |s: &str| s.strip_prefix(prefix).unwrap_or(s).to_lowercase();
        let (first, rest) = match message.split_once(char::is_whitespace) {
            Some((first, rest)) => (first, rest),
            None => (message, ""),
        };
        if !first.is_empty() && bare(first) == bare(self.command.trim()) {
            rest.trim()
        } else {
            message
        }
    }
}

/// Handler outcome. `error` marks a user-visible failure with no state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub message: String,
    pub error: bool,
}

impl Reply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// No command by that name; a secondary handler may take it.
    NotHandled,
    Handled {
        reply: Reply,
        reply_to: Option<String>,
    },
}

impl Dispatch {
    pub fn reply(&self) -> Option<&Reply> {
        match self {
            Dispatch::NotHandled => None,
            Dispatch::Handled { reply, .. } => Some(reply),
        }
    }
}

/// Outbound side of the chat transport.
pub trait ChatSink {
    fn say(&mut self, text: &str, reply_to: Option<&str>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_text_strips_command_token() {
        let event = CommandEvent::new("ana", "layout", "!layout Full Overlay", UserFlags::default());
        assert_eq!(event.argument_text("!"), "Full Overlay");
    }

    #[test]
    fn argument_text_accepts_bare_arguments() {
        let event = CommandEvent::new("ana", "!pomo", "50/10/3", UserFlags::default());
        assert_eq!(event.argument_text("!"), "50/10/3");
        let event = CommandEvent::new("ana", "!pomo", "", UserFlags::default());
        assert_eq!(event.argument_text("!"), "");
    }

    #[test]
    fn event_deserializes_transport_payload() {
        let event: CommandEvent = serde_json::from_str(
            r#"{"user":"ana","command":"layout","message":"!layout split",
                "flags":{"mod":true},"extra":{"messageId":"m-1"}}"#,
        )
        .unwrap();
        assert!(event.flags.moderator);
        assert_eq!(event.extra.message_id.as_deref(), Some("m-1"));
    }
}
