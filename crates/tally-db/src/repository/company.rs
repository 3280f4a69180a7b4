//! # Company Repository
//!
//! Tenants. Every other table hangs off `companies.id`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use tally_core::Company;

/// Repository for company database operations.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

impl CompanyRepository {
    /// Creates a new CompanyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CompanyRepository { pool }
    }

    /// Creates a company with a generated ID.
    pub async fn create(&self, name: &str) -> DbResult<Company> {
        let company = Company {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO companies (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&company.id)
            .bind(&company.name)
            .bind(company.created_at)
            .execute(&self.pool)
            .await?;

        info!(company_id = %company.id, name = %company.name, "Company created");
        Ok(company)
    }

    /// Gets a company by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Company>> {
        debug!(company_id = %id, "Loading company");

        let company = sqlx::query_as::<_, Company>(
            "SELECT id, name, created_at FROM companies WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    /// Lists all companies, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Company>> {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT id, name, created_at FROM companies ORDER BY created_at, name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(companies)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
