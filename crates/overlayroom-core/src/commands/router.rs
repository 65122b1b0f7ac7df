use super::handlers;
use super::{ChatSink, CommandEvent, Dispatch, Reply};
use crate::context::OverlayContext;
use crate::permission::{Permission, Role};
use crate::storage::ChatConfig;

pub type Handler = fn(&mut OverlayContext, &Invocation<'_>) -> Reply;

/// One row of the command table.
pub struct CommandEntry {
    pub names: &'static [&'static str],
    pub permission: Permission,
    pub usage: &'static str,
    pub handler: Handler,
}

/// What a handler sees of the incoming event.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    /// Lowercased login of the invoker.
    pub user: String,
    pub role: Role,
    /// Whitespace-separated arguments.
    pub args: Vec<&'a str>,
    /// Raw argument text.
    pub text: &'a str,
}

impl Invocation<'_> {
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).copied()
    }

    /// Arguments from `index` on, joined by single spaces.
    pub fn rest(&self, index: usize) -> String {
        self.args.get(index..).map(|a| a.join(" ")).unwrap_or_default()
    }
}

pub static COMMANDS: &[CommandEntry] = &[
    CommandEntry {
        names: &["layout"],
        permission: Permission::ModOnly,
        usage: "!layout [name]",
        handler: handlers::layout,
    },
    CommandEntry {
        names: &["layouts"],
        permission: Permission::Open,
        usage: "!layouts",
        handler: handlers::list_layouts,
    },
    CommandEntry {
        names: &["resetpanel"],
        permission: Permission::ModOnly,
        usage: "!resetpanel <panel> [layout]",
        handler: handlers::reset_panel,
    },
    CommandEntry {
        names: &["resetlayout"],
        permission: Permission::ModOnly,
        usage: "!resetlayout [layout]",
        handler: handlers::reset_layout,
    },
    CommandEntry {
        names: &["theme"],
        permission: Permission::ModOnly,
        usage: "!theme [name]",
        handler: handlers::theme,
    },
    CommandEntry {
        names: &["pomo"],
        permission: Permission::ModOnly,
        usage: "!pomo [focus]/[break]/[sessions]",
        handler: handlers::pomo_start,
    },
    CommandEntry {
        names: &["pomopause"],
        permission: Permission::ModOnly,
        usage: "!pomopause",
        handler: handlers::pomo_pause,
    },
    CommandEntry {
        names: &["pomoresume"],
        permission: Permission::ModOnly,
        usage: "!pomoresume",
        handler: handlers::pomo_resume,
    },
    CommandEntry {
        names: &["pomostop"],
        permission: Permission::ModOnly,
        usage: "!pomostop",
        handler: handlers::pomo_stop,
    },
    CommandEntry {
        names: &["pomoreset"],
        permission: Permission::ModOnly,
        usage: "!pomoreset",
        handler: handlers::pomo_reset,
    },
    CommandEntry {
        names: &["pomostatus"],
        permission: Permission::Open,
        usage: "!pomostatus",
        handler: handlers::pomo_status,
    },
    CommandEntry {
        names: &["backlog", "bl"],
        permission: Permission::Open,
        usage: "!backlog [add [p1-p5] <text> | done <n> | remove <n>]",
        handler: handlers::backlog,
    },
    CommandEntry {
        names: &["backlogclear", "clearbacklog"],
        permission: Permission::ModOnly,
        usage: "!backlogclear [user]",
        handler: handlers::backlog_clear,
    },
    CommandEntry {
        names: &["setinfo"],
        permission: Permission::Open,
        usage: "!setinfo <field> <value>",
        handler: handlers::set_info,
    },
    CommandEntry {
        names: &["getinfo"],
        permission: Permission::Open,
        usage: "!getinfo [user]",
        handler: handlers::get_info,
    },
    CommandEntry {
        names: &["stats"],
        permission: Permission::Open,
        usage: "!stats",
        handler: handlers::stats,
    },
];

/// Lowercase a login and drop a leading `@`.
pub(crate) fn normalize_user(user: &str) -> String {
    user.trim().trim_start_matches('@').to_lowercase()
}

pub struct CommandRouter {
    prefix: String,
    denial: String,
}

impl CommandRouter {
    pub fn new(chat: &ChatConfig) -> Self {
        Self {
            prefix: chat.command_prefix.clone(),
            denial: chat.denial_message.clone(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Case-insensitive lookup; the chat prefix is optional.
    pub fn lookup(&self, name: &str) -> Option<&'static CommandEntry> {
        let name = name.trim();
        let name = name.strip_prefix(self.prefix.as_str()).unwrap_or(name);
        let name = name.to_lowercase();
        COMMANDS.iter().find(|c| c.names.contains(&name.as_str()))
    }

    pub fn dispatch(&self, ctx: &mut OverlayContext, event: &CommandEvent) -> Dispatch {
        let Some(entry) = self.lookup(&event.command) else {
            return Dispatch::NotHandled;
        };
        let reply_to = event.extra.message_id.clone();
        let user = normalize_user(&event.user);
        let role = Role::classify(&event.flags);

        if !entry.permission.allows(role) {
            tracing::warn!(%user, command = entry.names[0], "permission denied");
            return Dispatch::Handled {
                reply: Reply::error(self.denial.clone()),
                reply_to,
            };
        }

        let text = event.argument_text(&self.prefix);
        let invocation = Invocation {
            user,
            role,
            args: text.split_whitespace().collect(),
            text,
        };
        let reply = (entry.handler)(ctx, &invocation);
        tracing::info!(
            user = %invocation.user,
            command = entry.names[0],
            error = reply.error,
            "command dispatched"
        );
        Dispatch::Handled { reply, reply_to }
    }

    /// Dispatch and send any reply back through `sink`.
    pub fn dispatch_and_reply(
        &self,
        ctx: &mut OverlayContext,
        event: &CommandEvent,
        sink: &mut dyn ChatSink,
    ) -> Dispatch {
        let outcome = self.dispatch(ctx, event);
        if let Dispatch::Handled { reply, reply_to } = &outcome {
            sink.say(&reply.message, reply_to.as_deref());
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ChatConfig;

    #[test]
    fn lookup_is_case_insensitive_and_prefix_optional() {
        let router = CommandRouter::new(&ChatConfig::default());
        assert_eq!(router.lookup("!LAYOUT").unwrap().names[0], "layout");
        assert_eq!(router.lookup("PomoStatus").unwrap().names[0], "pomostatus");
        assert_eq!(router.lookup("bl").unwrap().names[0], "backlog");
        assert!(router.lookup("!lurk").is_none());
    }

    #[test]
    fn names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for entry in COMMANDS {
            for name in entry.names {
                assert!(seen.insert(*name), "duplicate command name {name}");
            }
        }
    }

    #[test]
    fn only_status_and_viewer_commands_are_open() {
        let open: Vec<_> = COMMANDS
            .iter()
            .filter(|c| c.permission == Permission::Open)
            .map(|c| c.names[0])
            .collect();
        assert_eq!(
            open,
            vec!["layouts", "pomostatus", "backlog", "setinfo", "getinfo", "stats"]
        );
    }

    #[test]
    fn user_normalisation() {
        assert_eq!(normalize_user(" @SomeViewer "), "someviewer");
    }
}
