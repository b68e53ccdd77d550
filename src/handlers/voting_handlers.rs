use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::auth::{require_role, AuthContext, ADMIN_ROLES};
use crate::db::{TenantTx, Tenants};
use crate::errors::AppError;
use crate::models::assembly;
use crate::models::attendee;
use crate::models::voting::{self, default_options, Voting, VotingStats, VotingStatus};
use crate::validate;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenVotingRequest {
    pub question: String,
    /// Defaults to a binary yes/no ballot.
    pub options: Option<Vec<String>>,
    /// Link the round to an agenda item for stats-by-numeral lookups.
    pub agenda_numeral: Option<i32>,
}

/// POST /assemblies/{id}/votings — open a voting round.
///
/// Requires the assembly to be in progress; at most one round may be
/// active per assembly, so a concurrent second open fails Conflict.
pub async fn open(
    tenants: web::Data<Tenants>,
    ctx: AuthContext,
    path: web::Path<i64>,
    body: web::Json<OpenVotingRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&ctx, ADMIN_ROLES)?;

    let assembly_id = path.into_inner();
    if let Some(msg) = validate::validate_required(&body.question, "Question", 500) {
        return Err(AppError::Validation(msg));
    }
    let options = body.options.clone().unwrap_or_else(default_options);
    if let Some(msg) = validate::validate_options(&options) {
        return Err(AppError::Validation(msg));
    }

    let db = tenants.handle(&ctx.tenant_schema)?;
    let mut tx = db.begin().await?;

    if let Some(numeral) = body.agenda_numeral {
        let agenda = assembly::find_agenda(&mut tx, assembly_id).await?;
        if !agenda.iter().any(|item| item.numeral == numeral) {
            return Err(AppError::NotFound(format!("Agenda item {numeral}")));
        }
    }

    let opened = voting::open(
        &mut tx,
        assembly_id,
        body.agenda_numeral,
        body.question.trim(),
        &options,
    )
    .await?;

    let round = match opened {
        Some(round) => round,
        None => {
            // The guarded insert wrote nothing: missing assembly or wrong state.
            return match assembly::find_by_id(&mut tx, assembly_id).await? {
                None => Err(AppError::NotFound("Assembly".to_string())),
                Some(found) => Err(AppError::Conflict(format!(
                    "Votings can only be opened while the assembly is in progress (currently {})",
                    found.status.as_str()
                ))),
            };
        }
    };
    tx.commit().await?;

    let details = serde_json::json!({
        "question": round.question,
        "agendaNumeral": round.agenda_numeral,
    });
    let _ = crate::audit::log(&db, ctx.user_id, "voting.opened", "voting", round.id, details).await;

    Ok(HttpResponse::Created().json(round))
}

async fn stats_for(tx: &mut TenantTx, round: &Voting) -> Result<VotingStats, AppError> {
    let tallies = voting::option_tallies(tx, round.id).await?;
    let registered = attendee::total_registered_coefficient(tx, round.assembly_id).await?;
    Ok(VotingStats::compute(round, &tallies, registered))
}

/// GET /assemblies/{id}/votings — all rounds with current snapshots.
pub async fn list(
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
    let rounds = voting::find_by_assembly(&mut tx, assembly_id).await?;
    let mut snapshots = Vec::with_capacity(rounds.len());
    for round in &rounds {
        snapshots.push(stats_for(&mut tx, round).await?);
    }
    tx.commit().await?;
    Ok(HttpResponse::Ok().json(snapshots))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub voting_id: i64,
    pub option_value: String,
}

/// POST /assemblies/{id}/vote — cast one weighted ballot.
///
/// The vote insert and the tally increment run in one transaction; the
/// (voting, user) uniqueness constraint is the backstop that makes a
/// concurrent duplicate lose with Conflict instead of skewing the tally.
pub async fn cast(
    tenants: web::Data<Tenants>,
    ctx: AuthContext,
    path: web::Path<i64>,
    body: web::Json<CastVoteRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let assembly_id = path.into_inner();
    let db = tenants.handle(&ctx.tenant_schema)?;
    let mut tx = db.begin().await?;

    let round = voting::find_by_id(&mut tx, body.voting_id)
        .await?
        .filter(|r| r.assembly_id == assembly_id)
        .ok_or_else(|| AppError::NotFound("Voting".to_string()))?;
    if round.status != VotingStatus::Active {
        return Err(AppError::Conflict("Voting is closed".to_string()));
    }
    if !round.options.iter().any(|o| o == &body.option_value) {
        return Err(AppError::Validation(format!(
            "Option '{}' is not part of this voting",
            body.option_value
        )));
    }

    let registered = attendee::find(&mut tx, assembly_id, ctx.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Forbidden("Only registered attendees may vote in this assembly".to_string())
        })?;

    let origin_ip = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("")
        .to_string();
    let origin_user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let vote = voting::cast(
        &mut tx,
        round.id,
        &registered,
        &body.option_value,
        &origin_ip,
        &origin_user_agent,
    )
    .await?;
    tx.commit().await?;

    let details = serde_json::json!({
        "votingId": round.id,
        "coefficient": registered.coefficient,
    });
    let _ = crate::audit::log(&db, ctx.user_id, "vote.cast", "voting", round.id, details).await;

    Ok(HttpResponse::Created().json(vote))
}

/// POST /votings/{id}/close — close a round and freeze its result.
pub async fn close(
    tenants: web::Data<Tenants>,
    ctx: AuthContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_role(&ctx, ADMIN_ROLES)?;

    let voting_id = path.into_inner();
    let db = tenants.handle(&ctx.tenant_schema)?;
    let mut tx = db.begin().await?;
    voting::find_by_id(&mut tx, voting_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Voting".to_string()))?;

    if !voting::close(&mut tx, voting_id).await? {
        return Err(AppError::Conflict("Voting is already closed".to_string()));
    }

    // Re-read after the close so the snapshot carries the final state.
    let round = voting::find_by_id(&mut tx, voting_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Voting".to_string()))?;
    let result = stats_for(&mut tx, &round).await?;
    tx.commit().await?;

    let details = serde_json::json!({
        "totalVotes": result.total_votes,
        "totalCoefficientVoted": result.total_coefficient_voted,
    });
    let _ = crate::audit::log(&db, ctx.user_id, "voting.closed", "voting", voting_id, details).await;

    Ok(HttpResponse::Ok().json(result))
}

/// GET /votings/{id}/stats — running (or final) tallies.
pub async fn stats(
    tenants: web::Data<Tenants>,
    ctx: AuthContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let voting_id = path.into_inner();
    let db = tenants.handle(&ctx.tenant_schema)?;
    let mut tx = db.begin().await?;
    let round = voting::find_by_id(&mut tx, voting_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Voting".to_string()))?;
    let snapshot = stats_for(&mut tx, &round).await?;
    tx.commit().await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaStatsQuery {
    pub assembly_id: i64,
    pub agenda_numeral: i32,
}

/// GET /assemblies/voting/stats?assemblyId=..&agendaNumeral=.. — tallies
/// for the round attached to an agenda item.
pub async fn stats_by_agenda(
    tenants: web::Data<Tenants>,
    ctx: AuthContext,
    query: web::Query<AgendaStatsQuery>,
) -> Result<HttpResponse, AppError> {
    let db = tenants.handle(&ctx.tenant_schema)?;
    let mut tx = db.begin().await?;
    let round = voting::find_by_agenda_numeral(&mut tx, query.assembly_id, query.agenda_numeral)
        .await?
        .ok_or_else(|| AppError::NotFound("Voting for agenda item".to_string()))?;
    let snapshot = stats_for(&mut tx, &round).await?;
    tx.commit().await?;
    Ok(HttpResponse::Ok().json(snapshot))
}
