//! # Tally CLI
//!
//! Imports and exports sales CSV files.
//!
//! ```bash
//! tally company create "Acme Jewelry"      # prints the new company ID
//! tally validate sales.csv                 # pre-flight check, exit 1 if invalid
//! tally import sales.csv --company <ID> --user alice --progress
//! tally export --company <ID> --start 2024-01-01 --end 2024-01-31
//! tally template --out ./downloads
//! tally summary --company <ID>             # JSON report
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tally_core::validation::parse_date;
use tally_interchange::InterchangeConfig;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Import and export sales CSV files", long_about = None)]
struct Cli {
    /// Config file (default: platform config dir, interchange.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage companies
    Company {
        #[command(subcommand)]
        action: CompanyAction,
    },

    /// Check a CSV file without importing it
    Validate {
        /// CSV file
        file: PathBuf,
    },

    /// Validate, then import a CSV file
    Import {
        /// CSV file
        file: PathBuf,

        /// Company to import into
        #[arg(short, long)]
        company: String,

        /// User recorded on every imported sale
        #[arg(short, long)]
        user: String,

        /// Commit in batches and print progress
        #[arg(long)]
        progress: bool,
    },

    /// Export sales to a timestamped CSV file
    Export {
        /// Company to export
        #[arg(short, long)]
        company: String,

        /// First sale date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,

        /// Last sale date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,

        /// Output directory (default: export.output_dir)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Write the import template
    Template {
        /// Output directory (default: export.output_dir)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print a sales summary as JSON
    Summary {
        /// Company to summarize
        #[arg(short, long)]
        company: String,

        /// First sale date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,

        /// Last sale date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum CompanyAction {
    /// Create a company and print its ID
    Create {
        /// Company name
        name: String,
    },

    /// List companies
    List,
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_date("date", raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = InterchangeConfig::load(cli.config)?;
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    match cli.command {
        Commands::Company { action } => match action {
            CompanyAction::Create { name } => commands::create_company(&config, &name).await,
            CompanyAction::List => commands::list_companies(&config).await,
        },
        Commands::Validate { file } => commands::validate(&config, &file),
        Commands::Import {
            file,
            company,
            user,
            progress,
        } => commands::import(&config, &file, &company, &user, progress).await,
        Commands::Export {
            company,
            start,
            end,
            out,
        } => commands::export(&config, &company, start, end, out).await,
        Commands::Template { out } => commands::template(&config, out),
        Commands::Summary {
            company,
            start,
            end,
        } => commands::summary(&config, &company, start, end).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_import_args() {
        let cli = Cli::try_parse_from([
            "tally", "import", "sales.csv", "--company", "c1", "--user", "alice", "--progress",
        ])
        .unwrap();

        match cli.command {
            Commands::Import {
                file,
                company,
                user,
                progress,
            } => {
                assert_eq!(file, PathBuf::from("sales.csv"));
                assert_eq!(company, "c1");
                assert_eq!(user, "alice");
                assert!(progress);
            }
            _ => panic!("expected import"),
        }
    }

    #[test]
    fn test_export_dates_are_parsed() {
        let cli = Cli::try_parse_from([
            "tally", "--db", "x.db", "export", "-c", "c1", "--start", "2024-01-01",
        ])
        .unwrap();

        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        match cli.command {
            Commands::Export { start, end, .. } => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(end, None);
            }
            _ => panic!("expected export"),
        }

        assert!(Cli::try_parse_from(["tally", "export", "-c", "c1", "--end", "31/01/2024"]).is_err());
    }
}
