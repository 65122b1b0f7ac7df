//! Command handlers. Each one either mutates the context and says what it
//! did, or returns an error reply and leaves everything untouched.

use chrono::Utc;

use super::router::{normalize_user, Invocation};
use super::Reply;
use crate::context::OverlayContext;
use crate::features::backlog::{MAX_PRIORITY, MIN_PRIORITY};
use crate::features::{BacklogItem, StatsSummary, ThemeBook, DEFAULT_PRIORITY};
use crate::layout::{LayoutPreset, PanelKey};
use crate::timer::{format_clock, TimerStatus};

// ── Layout ───────────────────────────────────────────────────────────

fn layout_listing(ctx: &OverlayContext) -> String {
    let names: Vec<String> = ctx
        .layout
        .available_layouts()
        .into_iter()
        .map(|l| format!("{} ({})", l.key, l.display_name))
        .collect();
    format!("Available layouts: {}", names.join(", "))
}

/// Resolve an optional layout argument, defaulting to the active layout.
fn target_layout(ctx: &OverlayContext, input: &str) -> Result<LayoutPreset, Reply> {
    if input.is_empty() {
        let active = ctx.layout.active_layout().unwrap_or_default();
        return ctx
            .layout
            .registry()
            .get(active)
            .cloned()
            .ok_or_else(|| Reply::error("No layout is active."));
    }
    ctx.layout.registry().resolve(input).cloned().ok_or_else(|| {
        Reply::error(format!("Unknown layout '{input}'. {}", layout_listing(ctx)))
    })
}

pub(super) fn list_layouts(ctx: &mut OverlayContext, _inv: &Invocation<'_>) -> Reply {
    Reply::ok(layout_listing(ctx))
}

pub(super) fn layout(ctx: &mut OverlayContext, inv: &Invocation<'_>) -> Reply {
    if inv.args.is_empty() {
        return Reply::ok(layout_listing(ctx));
    }
    let preset = match target_layout(ctx, inv.text) {
        Ok(preset) => preset,
        Err(reply) => return reply,
    };
    match ctx.layout.apply_layout(&preset.name) {
        Ok(_) => Reply::ok(format!("Layout changed to {}.", preset.display_name)),
        Err(e) => Reply::error(e.to_string()),
    }
}

pub(super) fn reset_panel(ctx: &mut OverlayContext, inv: &Invocation<'_>) -> Reply {
    let Some(panel_arg) = inv.arg(0) else {
        return Reply::error("Usage: !resetpanel <panel> [layout]");
    };
    let panel: PanelKey = match panel_arg.parse() {
        Ok(panel) => panel,
        Err(_) => {
            let known: Vec<&str> = PanelKey::ALL.iter().map(|p| p.as_str()).collect();
            return Reply::error(format!(
                "Unknown panel '{panel_arg}'. Panels: {}",
                known.join(", ")
            ));
        }
    };
    let preset = match target_layout(ctx, &inv.rest(1)) {
        Ok(preset) => preset,
        Err(reply) => return reply,
    };
    match ctx.layout.reset_panel_position(panel, &preset.name) {
        Ok(true) => Reply::ok(format!(
            "Reset {panel} to its default position in {}.",
            preset.display_name
        )),
        Ok(false) => Reply::ok(format!(
            "{panel} is already at its default position in {}.",
            preset.display_name
        )),
        Err(e) => Reply::error(e.to_string()),
    }
}

pub(super) fn reset_layout(ctx: &mut OverlayContext, inv: &Invocation<'_>) -> Reply {
    let preset = match target_layout(ctx, inv.text) {
        Ok(preset) => preset,
        Err(reply) => return reply,
    };
    match ctx.layout.reset_layout_positions(&preset.name) {
        Ok(0) => Reply::ok(format!(
            "{} has no custom panel positions.",
            preset.display_name
        )),
        Ok(n) => Reply::ok(format!(
            "Reset {n} panel position{} in {}.",
            if n == 1 { "" } else { "s" },
            preset.display_name
        )),
        Err(e) => Reply::error(e.to_string()),
    }
}

// ── Theme ────────────────────────────────────────────────────────────

fn theme_listing() -> String {
    let names: Vec<String> = ThemeBook::all()
        .iter()
        .map(|t| format!("{} ({})", t.key, t.display_name))
        .collect();
    format!("Available themes: {}", names.join(", "))
}

pub(super) fn theme(ctx: &mut OverlayContext, inv: &Invocation<'_>) -> Reply {
    if inv.args.is_empty() {
        return Reply::ok(format!(
            "Current theme: {}. {}",
            ctx.themes.active().display_name,
            theme_listing()
        ));
    }
    match ThemeBook::resolve(inv.text) {
        Some(theme) => {
            ctx.themes.set(theme);
            Reply::ok(format!("Theme changed to {}.", theme.display_name))
        }
        None => Reply::error(format!("Unknown theme '{}'. {}", inv.text, theme_listing())),
    }
}

// ── Pomodoro ─────────────────────────────────────────────────────────

/// Split `25/5/4`, `25 5 4` or `25/5` into up to three numbers. Anything
/// that does not parse falls back to the configured default.
fn pomo_arguments(text: &str, defaults: [i64; 3]) -> [i64; 3] {
    let mut values = defaults;
    let parts = text
        .split(|c: char| c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    for (slot, part) in values.iter_mut().zip(parts) {
        if let Ok(n) = part.parse::<i64>() {
            *slot = n;
        }
    }
    values
}

pub(super) fn pomo_start(ctx: &mut OverlayContext, inv: &Invocation<'_>) -> Reply {
    let t = &ctx.config.timer;
    let defaults = [
        i64::from(t.focus_minutes),
        i64::from(t.break_minutes),
        i64::from(t.sessions),
    ];
    let [focus, brk, sessions] = pomo_arguments(inv.text, defaults);
    let hook = ctx.completion_hook();
    ctx.timer.start_cycle(focus, brk, sessions, Some(hook));

    let s = ctx.timer.state();
    Reply::ok(format!(
        "Pomodoro started: {} x {} min focus, {} min breaks. Session 1/{} is on!",
        s.total_sessions, s.focus_duration, s.break_duration, s.total_sessions
    ))
}

pub(super) fn pomo_pause(ctx: &mut OverlayContext, _inv: &Invocation<'_>) -> Reply {
    match ctx.timer.pause() {
        Some(_) => Reply::ok(format!(
            "Timer paused at {}.",
            format_clock(ctx.timer.state().current_seconds)
        )),
        None => Reply::error("The timer is not running."),
    }
}

pub(super) fn pomo_resume(ctx: &mut OverlayContext, _inv: &Invocation<'_>) -> Reply {
    match ctx.timer.resume() {
        Some(_) => Reply::ok(format!(
            "Timer resumed with {} left.",
            format_clock(ctx.timer.state().current_seconds)
        )),
        None => Reply::error("The timer is not paused."),
    }
}

pub(super) fn pomo_stop(ctx: &mut OverlayContext, _inv: &Invocation<'_>) -> Reply {
    if ctx.timer.status() == TimerStatus::Stopped {
        return Reply::error("The timer is already stopped.");
    }
    match ctx.timer.stop() {
        Some(_) => Reply::ok("Timer stopped."),
        None => Reply::error("The timer is not active."),
    }
}

pub(super) fn pomo_reset(ctx: &mut OverlayContext, _inv: &Invocation<'_>) -> Reply {
    ctx.timer.reset();
    Reply::ok("Timer reset.")
}

pub(super) fn pomo_status(ctx: &mut OverlayContext, _inv: &Invocation<'_>) -> Reply {
    Reply::ok(ctx.timer.status_line())
}

// ── Backlog ──────────────────────────────────────────────────────────

fn describe(item: &BacklogItem) -> String {
    format!(
        "[{}] {} (p{})",
        if item.completed { "x" } else { " " },
        item.description,
        item.priority
    )
}

fn parse_position(arg: Option<&str>) -> Option<usize> {
    arg?.trim_start_matches('#').parse().ok()
}

/// `p1`..`p5` as a leading token sets the priority.
fn parse_priority(token: &str) -> Option<u8> {
    let digits = token.strip_prefix(['p', 'P'])?;
    let p: u8 = digits.parse().ok()?;
    (MIN_PRIORITY..=MAX_PRIORITY).contains(&p).then_some(p)
}

pub(super) fn backlog(ctx: &mut OverlayContext, inv: &Invocation<'_>) -> Reply {
    let user = inv.user.as_str();
    let sub = inv.arg(0).map(str::to_lowercase);
    match sub.as_deref() {
        None | Some("list") => {
            let items = ctx.backlog.items(user);
            if items.is_empty() {
                return Reply::ok(format!("@{user} your backlog is empty."));
            }
            let lines: Vec<String> = items
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{}. {}", i + 1, describe(item)))
                .collect();
            Reply::ok(format!("@{user} backlog: {}", lines.join(" | ")))
        }
        Some("add") => {
            let (priority, skip) = match inv.arg(1).and_then(parse_priority) {
                Some(p) => (p, 2),
                None => (DEFAULT_PRIORITY, 1),
            };
            let description = inv.rest(skip);
            if description.is_empty() {
                return Reply::error("Usage: !backlog add [p1-p5] <text>");
            }
            let now = Utc::now();
            let item = ctx.backlog.add(user, &description, priority, now);
            ctx.viewers.record_task(user, now);
            Reply::ok(format!("@{user} added to your backlog: {}", describe(&item)))
        }
        Some("done" | "complete" | "toggle") => match parse_position(inv.arg(1)) {
            Some(n) => match ctx.backlog.toggle(user, n) {
                Some(item) if item.completed => {
                    Reply::ok(format!("@{user} completed: {}", item.description))
                }
                Some(item) => Reply::ok(format!("@{user} reopened: {}", item.description)),
                None => Reply::error(format!("@{user} you have no backlog item #{n}.")),
            },
            None => Reply::error("Usage: !backlog done <n>"),
        },
        Some("remove" | "delete" | "rm") => match parse_position(inv.arg(1)) {
            Some(n) => match ctx.backlog.remove(user, n) {
                Some(item) => Reply::ok(format!("@{user} removed: {}", item.description)),
                None => Reply::error(format!("@{user} you have no backlog item #{n}.")),
            },
            None => Reply::error("Usage: !backlog remove <n>"),
        },
        Some(other) => Reply::error(format!(
            "Unknown backlog action '{other}'. Usage: !backlog [add [p1-p5] <text> | done <n> | remove <n>]"
        )),
    }
}

pub(super) fn backlog_clear(ctx: &mut OverlayContext, inv: &Invocation<'_>) -> Reply {
    match inv.arg(0) {
        Some(target) => {
            let target = normalize_user(target);
            let n = ctx.backlog.clear_user(&target);
            Reply::ok(format!("Cleared {n} backlog item(s) for {target}."))
        }
        None => {
            let n = ctx.backlog.clear_all();
            Reply::ok(format!("Cleared {n} backlog item(s)."))
        }
    }
}

// ── Viewer info ──────────────────────────────────────────────────────

pub(super) fn set_info(ctx: &mut OverlayContext, inv: &Invocation<'_>) -> Reply {
    let (Some(field), value) = (inv.arg(0), inv.rest(1)) else {
        return Reply::error("Usage: !setinfo <field> <value>");
    };
    if value.is_empty() {
        return Reply::error("Usage: !setinfo <field> <value>");
    }
    let field = field.to_lowercase();
    ctx.viewers.set_info(&inv.user, &field, &value, Utc::now());
    Reply::ok(format!("@{} set {field} to \"{value}\".", inv.user))
}

pub(super) fn get_info(ctx: &mut OverlayContext, inv: &Invocation<'_>) -> Reply {
    let target = inv
        .arg(0)
        .map(normalize_user)
        .unwrap_or_else(|| inv.user.clone());
    match ctx.viewers.get(&target) {
        Some(profile) if !profile.info.is_empty() => {
            let fields: Vec<String> = profile
                .info
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect();
            Reply::ok(format!("{target} | {}", fields.join(" | ")))
        }
        _ => Reply::ok(format!("No info set for {target}.")),
    }
}

pub(super) fn stats(ctx: &mut OverlayContext, _inv: &Invocation<'_>) -> Reply {
    let s = StatsSummary::collect(&ctx.viewers, &ctx.backlog, Utc::now());
    Reply::ok(format!(
        "Viewers: {} ({} active today) | Backlog: {} items, {} done ({:.1}%)",
        s.total_viewers,
        s.active_viewers_24h,
        s.total_backlog_items,
        s.completed_backlog_items,
        s.completion_rate
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pomo_arguments_fill_from_defaults() {
        let d = [25, 5, 4];
        assert_eq!(pomo_arguments("", d), [25, 5, 4]);
        assert_eq!(pomo_arguments("50/10", d), [50, 10, 4]);
        assert_eq!(pomo_arguments("0/0/99", d), [0, 0, 99]);
        assert_eq!(pomo_arguments("abc/7/x", d), [25, 7, 4]);
        assert_eq!(pomo_arguments("30 10 2", d), [30, 10, 2]);
    }

    #[test]
    fn priority_token() {
        assert_eq!(parse_priority("p5"), Some(5));
        assert_eq!(parse_priority("P1"), Some(1));
        assert_eq!(parse_priority("p9"), None);
        assert_eq!(parse_priority("pizza"), None);
    }

    #[test]
    fn position_token() {
        assert_eq!(parse_position(Some("#2")), Some(2));
        assert_eq!(parse_position(Some("two")), None);
        assert_eq!(parse_position(None), None);
    }
}
