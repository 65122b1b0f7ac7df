use clap::Subcommand;

use super::{open_context, print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print the timer state as JSON
    Status {
        /// Print the chat status line instead
        #[arg(long)]
        line: bool,
    },
    /// Move the logical clock forward and print the resulting events
    Advance {
        /// Seconds to advance
        seconds: u64,
    },
}

pub fn run(action: TimerAction, memory: bool) -> CliResult {
    let mut ctx = open_context(memory)?;

    match action {
        TimerAction::Status { line: true } => println!("{}", ctx.timer.status_line()),
        TimerAction::Status { line: false } => print_json(&ctx.timer.state())?,
        TimerAction::Advance { seconds } => {
            for event in ctx.tick(seconds) {
                println!("{}", serde_json::to_string(&event)?);
            }
            println!("{}", ctx.timer.status_line());
        }
    }
    Ok(())
}
