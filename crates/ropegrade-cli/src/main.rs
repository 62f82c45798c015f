//! ropegrade CLI: score answer sheets and manage medals from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

use commands::{OutputFormat, ReportFormat};

#[derive(Parser)]
#[command(
    name = "ropegrade",
    version,
    about = "Exam scoring and medals for rope-rescue training"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single answer sheet without recording anything
    Score {
        /// Path to a .toml answer sheet
        #[arg(long)]
        sheet: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Score sheets, award medals and record history
    Submit {
        /// Path to a .toml answer sheet or a directory of sheets
        #[arg(long)]
        sheet: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,

        /// Also write the import report as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show the medal catalog and which medals a user holds
    Medals {
        /// User id
        #[arg(long)]
        user: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show a user's attempt history per module and category
    History {
        /// User id
        #[arg(long)]
        user: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grant an instructor-awarded medal
    Grant {
        /// User id
        #[arg(long)]
        user: String,

        /// Medal id (e.g. "practitioner")
        #[arg(long)]
        medal: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate answer sheet TOML files
    Validate {
        /// Path to an answer sheet or directory
        #[arg(long)]
        sheet: PathBuf,
    },

    /// Create starter config and an example answer sheet
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ropegrade=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score { sheet, format } => commands::score::execute(sheet, format),
        Commands::Submit {
            sheet,
            config,
            format,
            output,
        } => commands::submit::execute(sheet, config, format, output).await,
        Commands::Medals { user, config } => commands::medals::execute(user, config).await,
        Commands::History { user, config } => commands::history::execute(user, config).await,
        Commands::Grant {
            user,
            medal,
            config,
        } => commands::grant::execute(user, medal, config).await,
        Commands::Validate { sheet } => commands::validate::execute(sheet),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
