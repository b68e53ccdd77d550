use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::TenantTx;
use crate::errors::AppError;

pub const QUORUM_THRESHOLD_KEY: &str = "quorum_threshold";
pub const AUDIT_RETENTION_KEY: &str = "audit_retention_days";

/// Session-start quorum default: half of the total complex coefficient.
pub const DEFAULT_QUORUM_THRESHOLD: &str = "0.5";
pub const DEFAULT_AUDIT_RETENTION_DAYS: i32 = 365;

/// A tenant setting for display and editing.
#[derive(Debug, Clone, Serialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

pub async fn find_all(tx: &mut TenantTx) -> Result<Vec<Setting>, AppError> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT key, value FROM settings ORDER BY key")
            .fetch_all(&mut **tx)
            .await?;
    Ok(rows
        .into_iter()
        .map(|(key, value)| Setting { key, value })
        .collect())
}

/// Get a single setting's value, returning the default if not set.
pub async fn get_value(tx: &mut TenantTx, key: &str, default: &str) -> Result<String, AppError> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = $1")
        .bind(key)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.map(|r| r.0).unwrap_or_else(|| default.to_string()))
}

pub async fn set_value(tx: &mut TenantTx, key: &str, value: &str) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES ($1, $2) \
         ON CONFLICT (key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// The complex's quorum threshold as a fraction of total coefficient.
/// Unparseable stored values fall back to the default rather than failing
/// the quorum check.
pub async fn quorum_threshold(tx: &mut TenantTx) -> Result<Decimal, AppError> {
    let raw = get_value(tx, QUORUM_THRESHOLD_KEY, DEFAULT_QUORUM_THRESHOLD).await?;
    Ok(raw.parse().unwrap_or_else(|_| {
        log::warn!("Unparseable {QUORUM_THRESHOLD_KEY} '{raw}', using default");
        DEFAULT_QUORUM_THRESHOLD.parse().unwrap()
    }))
}

pub async fn audit_retention_days(tx: &mut TenantTx) -> Result<i32, AppError> {
    let raw = get_value(
        tx,
        AUDIT_RETENTION_KEY,
        &DEFAULT_AUDIT_RETENTION_DAYS.to_string(),
    )
    .await?;
    Ok(raw.parse().unwrap_or(DEFAULT_AUDIT_RETENTION_DAYS))
}
