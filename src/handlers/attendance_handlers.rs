use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::{require_role, AuthContext, ADMIN_ROLES};
use crate::db::Tenants;
use crate::errors::AppError;
use crate::models::assembly;
use crate::models::attendee;
use crate::registry::{PgUnitRegistry, UnitRegistry};
use crate::validate;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAttendanceRequest {
    /// Check in someone else (front-desk flow); administrator-only.
    pub user_id: Option<i64>,
    pub delegate_name: Option<String>,
}

/// POST /assemblies/{id}/attendance — confirm attendance (check-in).
///
/// Looks up the user's unit in the property registry and freezes its
/// coefficient onto the attendee record. A second check-in for the same
/// user fails Conflict.
pub async fn register(
    tenants: web::Data<Tenants>,
    ctx: AuthContext,
    path: web::Path<i64>,
    body: web::Json<RegisterAttendanceRequest>,
) -> Result<HttpResponse, AppError> {
    let assembly_id = path.into_inner();

    let target_user = body.user_id.unwrap_or(ctx.user_id);
    if target_user != ctx.user_id {
        require_role(&ctx, ADMIN_ROLES)?;
    }
    if let Some(name) = &body.delegate_name {
        if let Some(msg) = validate::validate_optional(name, "Delegate name", 200) {
            return Err(AppError::Validation(msg));
        }
    }

    let db = tenants.handle(&ctx.tenant_schema)?;

    // Unit lookup goes through the external registry interface before the
    // write transaction opens.
    let unit = PgUnitRegistry::new(db.clone())
        .unit_for_user(target_user)
        .await?
        .ok_or_else(|| AppError::NotFound("Property unit for user".to_string()))?;

    let mut tx = db.begin().await?;
    let current = assembly::find_by_id(&mut tx, assembly_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assembly".to_string()))?;
    if current.status.is_terminal() {
        return Err(AppError::Conflict(format!(
            "Attendance is closed for a {} assembly",
            current.status.as_str()
        )));
    }

    let delegate = body.delegate_name.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let registered = attendee::insert(
        &mut tx,
        assembly_id,
        target_user,
        unit.id,
        unit.coefficient,
        delegate,
    )
    .await?;
    tx.commit().await?;

    let details = serde_json::json!({
        "userId": target_user,
        "unitId": unit.id,
        "coefficient": unit.coefficient,
    });
    let _ = crate::audit::log(
        &db,
        ctx.user_id,
        "attendance.registered",
        "assembly",
        assembly_id,
        details,
    )
    .await;

    Ok(HttpResponse::Created().json(registered))
}

/// GET /assemblies/{id}/attendance — the attendance roll.
pub async fn roll(
    tenants: web::Data<Tenants>,
    ctx: AuthContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let assembly_id = path.into_inner();
    let db = tenants.handle(&ctx.tenant_schema)?;
    let mut tx = db.begin().await?;
    assembly::find_by_id(&mut tx, assembly_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assembly".to_string()))?;
    let roll = attendee::find_roll(&mut tx, assembly_id).await?;
    tx.commit().await?;
    Ok(HttpResponse::Ok().json(roll))
}
