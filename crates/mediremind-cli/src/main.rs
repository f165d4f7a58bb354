use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "mediremind", version, about = "MediRemind CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Medication management
    Med {
        #[command(subcommand)]
        action: commands::med::MedAction,
    },
    /// Show upcoming reminders
    Schedule(commands::schedule::ScheduleArgs),
    /// Supply levels and dose taking
    Supply {
        #[command(subcommand)]
        action: commands::supply::SupplyAction,
    },
    /// Dose history
    History(commands::history::HistoryArgs),
    /// Lock-screen PIN and unlock
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// List frequency and duration templates
    Catalog(commands::catalog::CatalogArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MEDIREMIND_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Med { action } => commands::med::run(action),
        Commands::Schedule(args) => commands::schedule::run(args),
        Commands::Supply { action } => commands::supply::run(action),
        Commands::History(args) => commands::history::run(args),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Catalog(args) => commands::catalog::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
