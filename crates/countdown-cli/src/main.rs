use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "countdown", version, about = "Countdown timer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start or continue the countdown
    Start,
    /// Pause the running countdown
    Pause,
    /// Stop the countdown and reset it to the configured length
    Stop,
    /// Print the current timer state as JSON
    Status,
    /// Keep the timer in the foreground, ticking once per second
    Run {
        /// Start the countdown if it is not running
        #[arg(long)]
        start: bool,
    },
    /// Wait for the wake-up alarm and fire it when due
    Watch {
        /// Check once instead of waiting
        #[arg(long)]
        once: bool,
    },
    /// Inspect or act on the timer notification
    Notification {
        #[command(subcommand)]
        action: commands::notification::NotificationCommand,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("COUNTDOWN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Start => commands::timer::run(commands::timer::TimerAction::Start),
        Commands::Pause => commands::timer::run(commands::timer::TimerAction::Pause),
        Commands::Stop => commands::timer::run(commands::timer::TimerAction::Stop),
        Commands::Status => commands::timer::run(commands::timer::TimerAction::Status),
        Commands::Run { start } => commands::run::run(start),
        Commands::Watch { once } => commands::watch::run(once),
        Commands::Notification { action } => commands::notification::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "countdown", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        commands::write_stderr(&format!("error: {e}\n"));
        std::process::exit(1);
    }
}
