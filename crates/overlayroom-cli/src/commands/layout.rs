use clap::Subcommand;
use overlayroom_core::{OverlayContext, PanelKey, Position};

use super::{open_context, print_json, CliResult};

#[derive(Subcommand)]
pub enum LayoutAction {
    /// List layout presets
    List,
    /// Print the active layout and every panel placement as JSON
    Show,
    /// Apply a layout by key or display name
    Apply {
        /// Layout key or display name (e.g. "split", "Focus Mode")
        name: String,
    },
    /// Store a position override for a panel
    Move {
        /// Panel key (timer, tasks, backlog, viewer-info)
        panel: String,
        #[arg(allow_negative_numbers = true)]
        left: i32,
        #[arg(allow_negative_numbers = true)]
        top: i32,
        /// Layout to store the override in; defaults to the active layout
        #[arg(long)]
        layout: Option<String>,
    },
    /// Drop position overrides so panels return to their defaults
    Reset {
        /// Layout key or display name; defaults to the active layout
        layout: Option<String>,
        /// Only reset this panel
        #[arg(long)]
        panel: Option<String>,
    },
}

/// Resolve a user-supplied layout name, falling back to the active one.
fn target(ctx: &OverlayContext, name: Option<&str>) -> CliResult<String> {
    match name {
        Some(name) => ctx
            .layout
            .registry()
            .resolve(name)
            .map(|p| p.name.clone())
            .ok_or_else(|| format!("unknown layout: {name}").into()),
        None => ctx
            .layout
            .active_layout()
            .map(str::to_string)
            .ok_or_else(|| "no active layout".into()),
    }
}

pub fn run(action: LayoutAction, memory: bool) -> CliResult {
    let mut ctx = open_context(memory)?;

    match action {
        LayoutAction::List => {
            let active = ctx.layout.active_layout().unwrap_or_default();
            for summary in ctx.layout.available_layouts() {
                let marker = if summary.key == active { "*" } else { " " };
                println!(
                    "{marker} {:<10} {:<14} {}",
                    summary.key, summary.display_name, summary.description
                );
            }
        }
        LayoutAction::Show => print_json(&ctx.layout.scene())?,
        LayoutAction::Apply { name } => {
            let key = target(&ctx, Some(&name))?;
            let event = ctx.layout.apply_layout(&key)?;
            print_json(&event)?;
        }
        LayoutAction::Move {
            panel,
            left,
            top,
            layout,
        } => {
            let panel: PanelKey = panel.parse()?;
            let key = target(&ctx, layout.as_deref())?;
            let event = ctx
                .layout
                .save_panel_position(&key, panel, Position::new(left, top));
            if ctx.layout.active_layout() == Some(key.as_str()) {
                ctx.layout.apply_layout(&key)?;
            }
            print_json(&event)?;
        }
        LayoutAction::Reset { layout, panel } => {
            let key = target(&ctx, layout.as_deref())?;
            match panel {
                Some(panel) => {
                    let panel: PanelKey = panel.parse()?;
                    if ctx.layout.reset_panel_position(panel, &key)? {
                        println!("reset {panel} in {key}");
                    } else {
                        println!("{panel} has no override in {key}");
                    }
                }
                None => {
                    let removed = ctx.layout.reset_layout_positions(&key)?;
                    println!("removed {removed} override(s) from {key}");
                }
            }
        }
    }
    Ok(())
}
