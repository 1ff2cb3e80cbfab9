use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use forex::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        /// Currency to convert from, e.g. USD
        from: String,
        /// Currency to convert to, e.g. EUR
        to: String,
        /// Amount of money to convert
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },
    /// Replace {forex FROM TO}amount{/forex} tags in a file or standard input
    Render {
        /// File to read, standard input when omitted
        file: Option<PathBuf>,
    },
    /// Display the current reference rates
    Rates,
}

impl From<Commands> for forex::AppCommand {
    fn from(cmd: Commands) -> forex::AppCommand {
        match cmd {
            Commands::Convert { from, to, amount } => {
                forex::AppCommand::Convert { from, to, amount }
            }
            Commands::Render { file } => forex::AppCommand::Render { input: file },
            Commands::Rates => forex::AppCommand::Rates,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => forex::cli::setup::setup(),
        Some(cmd) => forex::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
