use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "overlayroom-cli", version, about = "Overlayroom CLI")]
struct Cli {
    /// Keep all overlay state in memory for this run
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch a single chat message
    Send(commands::chat::SendArgs),
    /// Read chat lines from stdin and tick the timer once per second
    Chat,
    /// Layout presets and panel positions
    Layout {
        #[command(subcommand)]
        action: commands::layout::LayoutAction,
    },
    /// Pomodoro timer
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Send(args) => commands::chat::send(args, cli.memory),
        Commands::Chat => commands::chat::live(cli.memory),
        Commands::Layout { action } => commands::layout::run(action, cli.memory),
        Commands::Timer { action } => commands::timer::run(action, cli.memory),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
