//! BIO-RED submission validator
//!
//! Validates partner `.xlsx` submissions against the nine BIO-RED templates,
//! one file at a time or a whole directory per batch.

use anyhow::Result;
use biored_logging::{init_logging, LogConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

/// Exit code for a rejected submission (fatal errors use 1)
const EXIT_REJECTED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "biored", about = "Validate BIO-RED partner spreadsheet submissions")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate one submission file
    Validate {
        /// The .xlsx file to validate
        file: PathBuf,

        /// Template id, name or number (inferred from the file name if omitted)
        #[arg(short, long)]
        template: Option<String>,

        /// Region or context label shown in the report (e.g. "Lithuania (LT01)")
        #[arg(short, long)]
        region: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Validator config file (default: ~/.biored/config.toml)
        #[arg(long, env = "BIORED_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Validate every .xlsx file in a directory
    Batch {
        /// Directory holding partner submissions
        dir: PathBuf,

        /// Write one JSON report per file into this directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Validator config file (default: ~/.biored/config.toml)
        #[arg(long, env = "BIORED_CONFIG")]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List templates, or show the fields of one template
    Templates {
        /// Template id, name or number
        id: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// What a command concluded about the submissions it looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match init_logging(LogConfig {
        app_name: "biored",
        verbose: cli.verbose,
    }) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: logging disabled: {:#}", err);
            None
        }
    };

    match run_command(cli) {
        Ok(Outcome::Accepted) => ExitCode::SUCCESS,
        Ok(Outcome::Rejected) => ExitCode::from(EXIT_REJECTED),
        Err(err) => {
            eprintln!("{:?}", err);
            ExitCode::from(1)
        }
    }
}

fn run_command(cli: Cli) -> Result<Outcome> {
    match cli.command {
        Commands::Validate {
            file,
            template,
            region,
            json,
            output,
            config,
        } => cli::validate::run(cli::validate::ValidateArgs {
            file,
            template,
            region,
            json,
            output,
            config,
        }),

        Commands::Batch {
            dir,
            output_dir,
            config,
            json,
        } => cli::batch::run(cli::batch::BatchArgs {
            dir,
            output_dir,
            config,
            json,
        }),

        Commands::Templates { id, json } => {
            cli::templates::run(cli::templates::TemplatesArgs { id, json })?;
            Ok(Outcome::Accepted)
        }
    }
}
