use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use rei::core::log::init_logging;

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

impl From<Commands> for rei::AppCommand {
    fn from(cmd: Commands) -> rei::AppCommand {
        match cmd {
            Commands::Analyze { json } => rei::AppCommand::Analyze { json },
            Commands::Scenarios => rei::AppCommand::Scenarios,
            Commands::Amortize { property, monthly } => {
                rei::AppCommand::Amortize { property, monthly }
            }
            Commands::Market { zip, json } => rei::AppCommand::Market {
                zip_codes: zip,
                json,
            },
            Commands::Quick { price, rent, zip } => rei::AppCommand::Quick {
                price,
                rent,
                zip_code: zip,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display investment metrics and IRR for each configured property
    Analyze {
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare conservative, moderate and optimistic assumptions
    Scenarios,
    /// Display the loan amortization schedule for a property
    Amortize {
        /// Property name as it appears in the configuration
        property: String,
        /// Show every monthly payment instead of yearly totals
        #[arg(long)]
        monthly: bool,
    },
    /// Fetch market statistics by zip code
    Market {
        /// Zip codes to look up (defaults to those of configured properties)
        #[arg(long)]
        zip: Vec<String>,
        /// Print the market data as JSON
        #[arg(long)]
        json: bool,
    },
    /// Estimate a listing from its advertised price
    Quick {
        /// Listing price, e.g. "$425,000"
        #[arg(long)]
        price: String,
        /// Advertised or estimated monthly rent
        #[arg(long)]
        rent: Option<String>,
        /// Zip code used to fill in market rent and appreciation
        #[arg(long)]
        zip: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => rei::cli::setup::setup_at_path(path),
            None => rei::cli::setup::setup(),
        },
        Some(cmd) => rei::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
