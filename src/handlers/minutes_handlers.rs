use actix_web::{web, HttpResponse};

use crate::auth::{require_role, AuthContext, ADMIN_ROLES};
use crate::db::Tenants;
use crate::errors::AppError;
use crate::models::minutes;

/// GET /assemblies/{id}/minutes — the structured minutes record for the
/// external document renderer. Only available once the assembly is
/// completed.
pub async fn payload(
    tenants: web::Data<Tenants>,
    ctx: AuthContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_role(&ctx, ADMIN_ROLES)?;

    let assembly_id = path.into_inner();
    let db = tenants.handle(&ctx.tenant_schema)?;
    let mut tx = db.begin().await?;
    let record = minutes::build_payload(&mut tx, assembly_id).await?;
    tx.commit().await?;

    let _ = crate::audit::log(
        &db,
        ctx.user_id,
        "minutes.generated",
        "assembly",
        assembly_id,
        serde_json::json!({ "votings": record.votings.len() }),
    )
    .await;

    Ok(HttpResponse::Ok().json(record))
}
