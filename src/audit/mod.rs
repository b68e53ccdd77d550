//! Audit trail for lifecycle transitions and vote casting.
//!
//! Writes are fire-and-forget: callers invoke `log` after their own commit
//! with `let _ =`, so a failing audit insert never rolls back the operation
//! it records. External notification sinks consume the same rows.

use serde_json::Value;

use crate::db::TenantDb;
use crate::errors::AppError;
use crate::models::setting;

pub async fn log(
    db: &TenantDb,
    user_id: i64,
    action: &str,
    target_type: &str,
    target_id: i64,
    details: Value,
) -> Result<(), AppError> {
    let mut tx = db.begin().await?;
    sqlx::query(
        "INSERT INTO audit_log (user_id, action, target_type, target_id, details) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user_id)
    .bind(action)
    .bind(target_type)
    .bind(target_id)
    .bind(details)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(())
}

/// Delete audit entries older than the tenant's retention window.
/// Runs at startup for each provisioned tenant.
pub async fn cleanup_old_entries(db: &TenantDb) {
    let retention_days = match retention_days(db).await {
        Ok(days) => days,
        Err(e) => {
            log::warn!("Audit cleanup skipped for '{}': {e}", db.schema());
            return;
        }
    };

    let result = async {
        let mut tx = db.begin().await?;
        let deleted = sqlx::query(
            "DELETE FROM audit_log WHERE created_at < now() - make_interval(days => $1)",
        )
        .bind(retention_days)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx.commit().await?;
        Ok::<u64, AppError>(deleted)
    }
    .await;

    match result {
        Ok(deleted) if deleted > 0 => {
            log::info!(
                "Audit cleanup for '{}': removed {deleted} entries older than {retention_days} days",
                db.schema()
            );
        }
        Ok(_) => {}
        Err(e) => log::warn!("Audit cleanup failed for '{}': {e}", db.schema()),
    }
}

async fn retention_days(db: &TenantDb) -> Result<i32, AppError> {
    let mut tx = db.begin().await?;
    let days = setting::audit_retention_days(&mut tx).await?;
    tx.commit().await?;
    Ok(days)
}
