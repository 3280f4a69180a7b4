//! # Interchange Service
//!
//! Entry point bound to one company. Checks the company exists, then hands
//! out importers and exporters that share its configuration and the
//! process-wide tenant locks.
//!
//! ## Usage
//! ```rust,ignore
//! let service = InterchangeService::open(db, &company_id, config, locks).await?;
//!
//! let report = service.validate(&csv);
//! if report.is_valid {
//!     let outcome = service.importer().import(&csv, &user_id).await?;
//!     for line in service.display_errors(&outcome) {
//!         println!("{line}");
//!     }
//! }
//! ```

use tracing::debug;

use tally_core::validation::validate_csv;
use tally_core::{Company, ValidationReport};
use tally_db::Database;

use crate::config::InterchangeConfig;
use crate::error::{InterchangeError, InterchangeResult};
use crate::exporter::SalesExporter;
use crate::importer::{ImportOutcome, SalesImporter};
use crate::locks::TenantLocks;

/// Import and export for one company.
#[derive(Debug, Clone)]
pub struct InterchangeService {
    db: Database,
    company: Company,
    config: InterchangeConfig,
    locks: TenantLocks,
}

impl InterchangeService {
    /// Binds to `company_id`.
    ///
    /// ## Returns
    /// * `Err(CompanyNotFound)` - no such company
    pub async fn open(
        db: Database,
        company_id: &str,
        config: InterchangeConfig,
        locks: TenantLocks,
    ) -> InterchangeResult<Self> {
        let company = db
            .companies()
            .get_by_id(company_id)
            .await?
            .ok_or_else(|| InterchangeError::CompanyNotFound(company_id.to_string()))?;

        debug!(company_id = %company.id, company = %company.name, "Interchange service opened");

        Ok(InterchangeService {
            db,
            company,
            config,
            locks,
        })
    }

    pub fn company(&self) -> &Company {
        &self.company
    }

    pub fn config(&self) -> &InterchangeConfig {
        &self.config
    }

    /// Pre-flight check of a file, sampling the configured number of rows.
    pub fn validate(&self, csv: &str) -> ValidationReport {
        validate_csv(csv, self.config.import.validation_sample_rows)
    }

    pub fn importer(&self) -> SalesImporter {
        SalesImporter::new(
            self.db.clone(),
            self.company.id.clone(),
            self.config.import.clone(),
            self.locks.clone(),
        )
    }

    pub fn exporter(&self) -> SalesExporter {
        SalesExporter::new(self.db.clone(), self.company.id.clone())
    }

    /// The capped error list shown after an import.
    pub fn display_errors<'o>(&self, outcome: &'o ImportOutcome) -> &'o [String] {
        outcome.display_errors(self.config.import.error_display_limit)
    }
}
