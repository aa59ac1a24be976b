use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "momentum", version, about = "Momentum habit tracker CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log practice minutes for the current day
    Practice {
        /// Minutes practiced
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// Log the current day as skipped
    Skip,
    /// Close the current day and move to the next
    Advance,
    /// Change a past practice day's minutes and recompute later days
    Edit {
        /// Day number to edit
        day: u32,
        /// New minutes for that day
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// Print the day log
    Log {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print progress toward the energy goal
    Status,
    /// Delete every logged day
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
    /// Practice session timer
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MOMENTUM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Practice { minutes } => commands::log::practice(minutes),
        Commands::Skip => commands::log::skip(),
        Commands::Advance => commands::log::advance(),
        Commands::Edit { day, minutes } => commands::log::edit(day, minutes),
        Commands::Log { json } => commands::log::show(json),
        Commands::Status => commands::log::status(),
        Commands::Reset { yes } => commands::log::reset(yes),
        Commands::Session { action } => commands::session::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
