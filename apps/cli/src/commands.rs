//! Command handlers. Each one opens what it needs and prints for a human,
//! except `summary`, which prints JSON.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use tracing::info;

use tally_core::validation::{validate_company_name, validate_csv};
use tally_core::ValidationReport;
use tally_db::Database;
use tally_interchange::{
    FnProgress, ImportOutcome, InterchangeConfig, InterchangeService, SalesExporter, TenantLocks,
};

async fn open_database(config: &InterchangeConfig) -> Result<Database> {
    let path = &config.database.path;
    Database::new(config.database.db_config())
        .await
        .with_context(|| format!("opening database {}", path.display()))
}

async fn open_service(config: &InterchangeConfig, company_id: &str) -> Result<InterchangeService> {
    let db = open_database(config).await?;
    let service = InterchangeService::open(db, company_id, config.clone(), TenantLocks::new()).await?;
    Ok(service)
}

fn read_csv(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))
}

// =============================================================================
// Companies
// =============================================================================

pub async fn create_company(config: &InterchangeConfig, name: &str) -> Result<()> {
    let name = validate_company_name(name)?;
    let db = open_database(config).await?;
    let company = db.companies().create(&name).await?;
    println!("{}", company.id);
    Ok(())
}

pub async fn list_companies(config: &InterchangeConfig) -> Result<()> {
    let db = open_database(config).await?;
    for company in db.companies().list().await? {
        println!("{}  {}", company.id, company.name);
    }
    Ok(())
}

// =============================================================================
// Validate / Import
// =============================================================================

fn print_report(report: &ValidationReport) {
    if report.is_valid {
        println!("✓ CSV file is valid");
    } else {
        println!("✗ CSV file is not valid:");
        for error in &report.errors {
            println!("  - {}", error);
        }
    }
}

pub fn validate(config: &InterchangeConfig, file: &Path) -> Result<()> {
    let csv = read_csv(file)?;
    let report = validate_csv(&csv, config.import.validation_sample_rows);
    print_report(&report);

    if !report.is_valid {
        bail!("{} failed validation", file.display());
    }
    Ok(())
}

pub async fn import(
    config: &InterchangeConfig,
    file: &Path,
    company_id: &str,
    user_id: &str,
    progress: bool,
) -> Result<()> {
    let csv = read_csv(file)?;
    let service = open_service(config, company_id).await?;

    let report = service.validate(&csv);
    if !report.is_valid {
        print_report(&report);
        bail!("{} failed validation; nothing was imported", file.display());
    }

    let importer = service.importer();
    let outcome = if progress {
        let sink = FnProgress::new(|percent, status, detail| {
            let mut err = std::io::stderr().lock();
            let _ = write!(err, "\r{:>3}% {} ({})\x1b[K", percent, status, detail);
            let _ = err.flush();
        });
        let outcome = importer.import_with_progress(&csv, user_id, &sink).await?;
        eprintln!();
        outcome
    } else {
        importer.import(&csv, user_id).await?
    };

    print_outcome(&outcome, config.import.error_display_limit);
    Ok(())
}

fn print_outcome(outcome: &ImportOutcome, limit: usize) {
    println!(
        "Imported {} sales ({} failed)",
        outcome.successful, outcome.failed
    );

    let shown = outcome.display_errors(limit);
    if shown.is_empty() {
        return;
    }

    println!("Errors:");
    for error in shown {
        println!("  - {}", error);
    }
    let hidden = outcome.hidden_error_count(limit);
    if hidden > 0 {
        println!("  ... and {} more", hidden);
    }
}

// =============================================================================
// Export / Template / Summary
// =============================================================================

pub async fn export(
    config: &InterchangeConfig,
    company_id: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    out: Option<PathBuf>,
) -> Result<()> {
    let service = open_service(config, company_id).await?;
    let file = service.exporter().export_file(start, end, Utc::now()).await?;

    let dir = out.unwrap_or_else(|| config.export.output_dir.clone());
    let path = file.write_to(&dir)?;

    info!(path = %path.display(), "Export written");
    println!("{}", path.display());
    Ok(())
}

pub fn template(config: &InterchangeConfig, out: Option<PathBuf>) -> Result<()> {
    let dir = out.unwrap_or_else(|| config.export.output_dir.clone());
    let path = SalesExporter::template_file()?.write_to(&dir)?;
    println!("{}", path.display());
    Ok(())
}

pub async fn summary(
    config: &InterchangeConfig,
    company_id: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<()> {
    let service = open_service(config, company_id).await?;
    let summary = service.exporter().summary(start, end).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
