use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hoopsbot", version, about = "Scheduled Telegram bot for a basketball team")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One scheduled invocation: run every check due right now
    Run,
    /// Roster inspection
    Roster {
        #[command(subcommand)]
        action: commands::roster::RosterAction,
    },
    /// Print a month's attendance report without sending it
    Report {
        /// Month to report, `YYYY-MM`; defaults to the current month
        #[arg(long)]
        month: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run => commands::run::run(),
        Commands::Roster { action } => commands::roster::run(action),
        Commands::Report { month } => commands::report::run(month.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
