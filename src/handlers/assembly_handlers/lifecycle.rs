use actix_web::{web, HttpResponse};

use crate::db::{TenantDb, TenantTx, Tenants};
use crate::errors::AppError;
use crate::auth::AuthContext;
use crate::models::assembly::{self, Assembly, AssemblyStatus};
use crate::models::{attendee, setting};
use crate::quorum::QuorumReport;
use crate::registry::{PgUnitRegistry, UnitRegistry};

/// Evaluate quorum for an assembly: registered attendance coefficient
/// against the threshold fraction of the complex total. Stateless, cheap,
/// recomputed on every call.
pub async fn quorum_report(
    db: &TenantDb,
    tx: &mut TenantTx,
    assembly_id: i64,
) -> Result<QuorumReport, AppError> {
    let registered = attendee::total_registered_coefficient(tx, assembly_id).await?;
    let threshold = setting::quorum_threshold(tx).await?;
    let total = PgUnitRegistry::new(db.clone())
        .total_complex_coefficient()
        .await?;
    Ok(QuorumReport::compute(registered, total, threshold))
}

/// Apply a lifecycle transition inside the caller's transaction.
///
/// Legality is checked against the state machine first; the write itself is
/// conditional on the from-state (and, for completion, on no round being
/// active) so a racing administrator loses with Conflict instead of
/// clobbering the state.
pub async fn apply_transition(
    db: &TenantDb,
    tx: &mut TenantTx,
    ctx: &AuthContext,
    current: &Assembly,
    to: AssemblyStatus,
) -> Result<(), AppError> {
    if !current.status.can_transition_to(to) {
        return Err(AppError::Conflict(format!(
            "Illegal transition {} -> {}",
            current.status.as_str(),
            to.as_str()
        )));
    }

    if to == AssemblyStatus::InProgress {
        let report = quorum_report(db, tx, current.id).await?;
        if !report.met {
            return Err(AppError::Conflict(format!(
                "Quorum not met: registered coefficient {} is below {} of {}",
                report.registered_coefficient, report.threshold, report.total_coefficient
            )));
        }
    }

    let applied = match to {
        AssemblyStatus::Completed => assembly::transition_to_completed(tx, current.id).await?,
        _ => assembly::transition(tx, current.id, current.status, to).await?,
    };

    if !applied {
        if to == AssemblyStatus::Completed && assembly::has_active_voting(tx, current.id).await? {
            return Err(AppError::Conflict(
                "Assembly has an active voting round and cannot be completed".to_string(),
            ));
        }
        return Err(AppError::Conflict(format!(
            "Assembly is no longer {}",
            current.status.as_str()
        )));
    }

    log::info!(
        "Assembly {} transition {} -> {} by user {}",
        current.id,
        current.status.as_str(),
        to.as_str(),
        ctx.user_id
    );
    Ok(())
}

/// GET /assemblies/{id}/quorum
pub async fn quorum(
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
    let report = quorum_report(&db, &mut tx, assembly_id).await?;
    tx.commit().await?;
    Ok(HttpResponse::Ok().json(report))
}
