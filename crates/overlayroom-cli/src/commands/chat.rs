//! Chat input: a one-shot `send` and a live stdin loop.
//!
//! Live lines look like `user: !cmd args`, with `user@mod:` or
//! `user@broadcaster:` marking privileged senders.

use std::time::Duration;

use clap::Args;
use overlayroom_core::{ChatSink, CommandEvent, CommandRouter, Dispatch, OverlayContext, UserFlags};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{open_context, CliResult};

#[derive(Args)]
pub struct SendArgs {
    /// Login of the sender
    #[arg(long, default_value = "streamer")]
    user: String,
    /// Send as a moderator
    #[arg(long = "mod")]
    moderator: bool,
    /// Send as the broadcaster
    #[arg(long)]
    broadcaster: bool,
    /// Message id replies should thread to
    #[arg(long)]
    message_id: Option<String>,
    /// Chat message, e.g. `!layout split`
    #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    message: Vec<String>,
}

/// Prints replies to stdout.
struct StdoutSink;

impl ChatSink for StdoutSink {
    fn say(&mut self, text: &str, reply_to: Option<&str>) {
        match reply_to {
            Some(id) => println!("[reply {id}] {text}"),
            None => println!("{text}"),
        }
    }
}

fn event_for(user: &str, flags: UserFlags, message: &str) -> CommandEvent {
    let command = message.split_whitespace().next().unwrap_or_default();
    CommandEvent::new(user, command, message, flags)
}

pub fn send(args: SendArgs, memory: bool) -> CliResult {
    let mut ctx = open_context(memory)?;
    let router = CommandRouter::new(&ctx.config.chat);

    let flags = UserFlags {
        moderator: args.moderator,
        broadcaster: args.broadcaster,
        ..UserFlags::default()
    };
    let message = args.message.join(" ");
    let mut event = event_for(&args.user, flags, &message);
    if let Some(id) = &args.message_id {
        event = event.with_message_id(id);
    }

    match router.dispatch_and_reply(&mut ctx, &event, &mut StdoutSink) {
        Dispatch::NotHandled => Err(format!("not a command: {message}").into()),
        Dispatch::Handled { .. } => Ok(()),
    }
}

/// Parse `user[@mod|@broadcaster]: message`.
fn parse_line(line: &str, prefix: &str) -> Option<CommandEvent> {
    let (sender, message) = line.split_once(':')?;
    let message = message.trim();
    if !message.starts_with(prefix) {
        return None;
    }
    let mut parts = sender.trim().split('@');
    let user = parts.next().filter(|u| !u.is_empty())?;
    let mut flags = UserFlags::default();
    for tag in parts {
        match tag.to_ascii_lowercase().as_str() {
            "mod" | "moderator" => flags.moderator = true,
            "broadcaster" | "owner" => flags.broadcaster = true,
            "vip" => flags.vip = true,
            "sub" | "subscriber" => flags.subscriber = true,
            _ => {}
        }
    }
    Some(event_for(user, flags, message))
}

fn announce_completions(ctx: &OverlayContext, sink: &mut dyn ChatSink) {
    for completion in ctx.drain_completions() {
        sink.say(&completion.announcement(), None);
    }
}

pub fn live(memory: bool) -> CliResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(run_live(memory))
}

async fn run_live(memory: bool) -> CliResult {
    let mut ctx = open_context(memory)?;
    let router = CommandRouter::new(&ctx.config.chat);
    let mut sink = StdoutSink;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    // The first tick fires immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(event) = parse_line(&line, router.prefix()) else {
                    continue;
                };
                if router.dispatch_and_reply(&mut ctx, &event, &mut sink) == Dispatch::NotHandled {
                    tracing::debug!(command = %event.command, "no handler for command");
                }
            }
            _ = ticker.tick() => {
                ctx.tick(1);
                announce_completions(&ctx, &mut sink);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_privileged_senders() {
        let event = parse_line("host@broadcaster: !layout split", "!").unwrap();
        assert_eq!(event.user, "host");
        assert!(event.flags.broadcaster);
        assert_eq!(event.command, "!layout");
        assert_eq!(event.argument_text("!"), "split");

        let event = parse_line("ana@mod: !pomo 50/10", "!").unwrap();
        assert!(event.flags.moderator);
    }

    #[test]
    fn ignores_plain_chat() {
        assert!(parse_line("ana: hello there", "!").is_none());
        assert!(parse_line("no separator", "!").is_none());
        assert!(parse_line(": !layout", "!").is_none());
    }
}
