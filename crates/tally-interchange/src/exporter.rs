//! # Sales Exporter
//!
//! Reads a company's sales back out as CSV in the same nine-column layout
//! the importer accepts, plus the blank template and a summary report.
//!
//! ```text
//!   list_for_export(company, start, end)     (LEFT JOINs, newest first)
//!        │
//!        ▼
//!   encode_record ── missing link ──► "Unknown Store" / "Unknown Product"
//!        │
//!        ▼
//!   write_csv ──► ExportFile { sales_export_<YYYYMMDD_HHMMSS>.csv, content }
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use tally_core::codec::{encode_record, export_filename, template_csv, write_csv, TEMPLATE_FILENAME};
use tally_core::validation::validate_date_range;
use tally_core::{SaleRow, SalesSummary};
use tally_db::Database;

use crate::error::InterchangeResult;

/// A named CSV document ready to be saved or downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFile {
    pub filename: String,
    pub content: String,
}

impl ExportFile {
    /// Writes the file into `dir`, creating the directory if needed.
    pub fn write_to(&self, dir: &Path) -> InterchangeResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.content)?;
        Ok(path)
    }
}

/// Exports one company's sales.
#[derive(Debug, Clone)]
pub struct SalesExporter {
    db: Database,
    company_id: String,
}

impl SalesExporter {
    pub fn new(db: Database, company_id: impl Into<String>) -> Self {
        SalesExporter {
            db,
            company_id: company_id.into(),
        }
    }

    /// CSV for every sale dated within `[start, end]`, newest first.
    ///
    /// Either bound may be open. A start after the end is an error.
    pub async fn export_csv(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> InterchangeResult<String> {
        validate_date_range(start, end)?;

        let records = self
            .db
            .sales()
            .list_for_export(&self.company_id, start, end)
            .await?;

        let rows: Vec<SaleRow> = records.iter().map(encode_record).collect();
        let csv = write_csv(&rows)?;

        info!(
            company_id = %self.company_id,
            start = ?start,
            end = ?end,
            rows = rows.len(),
            "Exported sales"
        );
        Ok(csv)
    }

    /// Same as [`export_csv`](Self::export_csv), named for `now`.
    pub async fn export_file(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> InterchangeResult<ExportFile> {
        Ok(ExportFile {
            filename: export_filename(now),
            content: self.export_csv(start, end).await?,
        })
    }

    /// The import template: header plus one sample row.
    pub fn template_file() -> InterchangeResult<ExportFile> {
        Ok(ExportFile {
            filename: TEMPLATE_FILENAME.to_string(),
            content: template_csv()?,
        })
    }

    /// Revenue and breakdowns over the same date window an export uses.
    pub async fn summary(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> InterchangeResult<SalesSummary> {
        validate_date_range(start, end)?;

        let records = self
            .db
            .sales()
            .list_for_export(&self.company_id, start, end)
            .await?;

        Ok(SalesSummary::from_records(&records))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
