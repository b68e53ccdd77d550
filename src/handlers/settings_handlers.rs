use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::auth::{require_role, AuthContext, ADMIN_ROLES};
use crate::db::Tenants;
use crate::errors::AppError;
use crate::models::setting;

/// GET /settings
pub async fn list(
    tenants: web::Data<Tenants>,
    ctx: AuthContext,
) -> Result<HttpResponse, AppError> {
    require_role(&ctx, ADMIN_ROLES)?;

    let db = tenants.handle(&ctx.tenant_schema)?;
    let mut tx = db.begin().await?;
    let settings = setting::find_all(&mut tx).await?;
    tx.commit().await?;
    Ok(HttpResponse::Ok().json(settings))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSettingsRequest {
    pub quorum_threshold: Option<Decimal>,
    pub audit_retention_days: Option<i32>,
}

/// PUT /settings — per-complex policy knobs.
pub async fn save(
    tenants: web::Data<Tenants>,
    ctx: AuthContext,
    body: web::Json<SaveSettingsRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&ctx, ADMIN_ROLES)?;

    if let Some(threshold) = body.quorum_threshold {
        if threshold <= Decimal::ZERO || threshold > Decimal::ONE {
            return Err(AppError::Validation(
                "Quorum threshold must be within (0, 1]".to_string(),
            ));
        }
    }
    if let Some(days) = body.audit_retention_days {
        if days < 1 {
            return Err(AppError::Validation(
                "Audit retention must be at least 1 day".to_string(),
            ));
        }
    }

    let db = tenants.handle(&ctx.tenant_schema)?;
    let mut tx = db.begin().await?;
    if let Some(threshold) = body.quorum_threshold {
        setting::set_value(&mut tx, setting::QUORUM_THRESHOLD_KEY, &threshold.to_string()).await?;
    }
    if let Some(days) = body.audit_retention_days {
        setting::set_value(&mut tx, setting::AUDIT_RETENTION_KEY, &days.to_string()).await?;
    }
    let settings = setting::find_all(&mut tx).await?;
    tx.commit().await?;

    let _ = crate::audit::log(
        &db,
        ctx.user_id,
        "settings.updated",
        "settings",
        0,
        serde_json::json!({}),
    )
    .await;

    Ok(HttpResponse::Ok().json(settings))
}
