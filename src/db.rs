use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use crate::errors::AppError;

pub const MIGRATIONS: &str = include_str!("schema.sql");

/// A transaction scoped to one tenant schema via `SET LOCAL search_path`.
pub type TenantTx = Transaction<'static, Postgres>;

pub async fn init_pool(database_url: &str) -> PgPool {
    PgPoolOptions::new()
        .max_connections(8)
        .connect(database_url)
        .await
        .expect("Failed to create DB pool")
}

/// Schema names come from forwarded identity headers, so they are validated
/// before ever being interpolated into `SET LOCAL search_path`.
pub fn valid_schema_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && name.starts_with(|c: char| c.is_ascii_lowercase() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Registry handing out tenant-scoped data handles.
///
/// All persistence goes through a `TenantDb`; there is no process-wide
/// connection whose target schema changes over time. Each operation opens a
/// transaction and applies `SET LOCAL search_path`, which reverts at
/// commit/rollback, so pooled connections never leak one tenant's schema
/// into another tenant's request.
#[derive(Clone)]
pub struct Tenants {
    pool: PgPool,
}

impl Tenants {
    pub fn new(pool: PgPool) -> Self {
        Tenants { pool }
    }

    pub fn handle(&self, schema: &str) -> Result<TenantDb, AppError> {
        if !valid_schema_name(schema) {
            return Err(AppError::Unauthorized(format!(
                "Invalid tenant schema '{schema}'"
            )));
        }
        Ok(TenantDb {
            pool: self.pool.clone(),
            schema: schema.to_string(),
        })
    }
}

/// Data handle scoped to a single tenant schema.
#[derive(Clone)]
pub struct TenantDb {
    pool: PgPool,
    schema: String,
}

impl TenantDb {
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Open a transaction with `search_path` pinned to this tenant's schema.
    /// Every query in the transaction, reads included, resolves unqualified
    /// table names inside the tenant schema only.
    pub async fn begin(&self) -> Result<TenantTx, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("SET LOCAL search_path TO {}", self.schema))
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

/// Create a tenant schema if missing and apply the table DDL inside it.
/// Called at startup for every schema listed in `TENANT_SCHEMAS`.
pub async fn ensure_tenant_schema(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    if !valid_schema_name(schema) {
        return Err(AppError::Validation(format!(
            "Invalid tenant schema '{schema}'"
        )));
    }
    let mut tx = pool.begin().await?;
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {schema}"))
        .execute(&mut *tx)
        .await?;
    sqlx::query(&format!("SET LOCAL search_path TO {schema}"))
        .execute(&mut *tx)
        .await?;
    sqlx::raw_sql(MIGRATIONS).execute(&mut *tx).await?;
    tx.commit().await?;
    log::info!("Tenant schema '{schema}' ready");
    Ok(())
}
