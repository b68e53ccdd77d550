use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::types::*;
use crate::db::TenantTx;
use crate::errors::{conflict_on_unique, AppError};
use crate::models::attendee::Attendee;

#[derive(sqlx::FromRow)]
struct VotingRow {
    id: i64,
    assembly_id: i64,
    agenda_numeral: Option<i32>,
    question: String,
    options: serde_json::Value,
    status: String,
    total_votes: i64,
    total_coefficient_voted: Decimal,
    opened_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
}

fn map_voting(row: VotingRow) -> Result<Voting, AppError> {
    let options: Vec<String> = serde_json::from_value(row.options)
        .map_err(|e| AppError::Db(sqlx::Error::Decode(Box::new(e))))?;
    let status = VotingStatus::parse(&row.status).ok_or_else(|| {
        AppError::Db(sqlx::Error::Decode(
            format!("unknown voting status '{}'", row.status).into(),
        ))
    })?;
    Ok(Voting {
        id: row.id,
        assembly_id: row.assembly_id,
        agenda_numeral: row.agenda_numeral,
        question: row.question,
        options,
        status,
        total_votes: row.total_votes,
        total_coefficient_voted: row.total_coefficient_voted,
        opened_at: row.opened_at,
        closed_at: row.closed_at,
    })
}

const VOTING_SELECT: &str = "SELECT id, assembly_id, agenda_numeral, question, options, status, \
                             total_votes, total_coefficient_voted, opened_at, closed_at FROM votings";

/// Open a voting round. The insert itself requires the assembly to be
/// in_progress (checked in the same statement), and the partial unique
/// index on active rounds turns a concurrent second open into Conflict.
/// Returns None when the assembly is missing or not in progress.
pub async fn open(
    tx: &mut TenantTx,
    assembly_id: i64,
    agenda_numeral: Option<i32>,
    question: &str,
    options: &[String],
) -> Result<Option<Voting>, AppError> {
    let options_json = serde_json::to_value(options)
        .map_err(|e| AppError::Validation(format!("Unencodable options: {e}")))?;
    let row: Option<VotingRow> = sqlx::query_as(
        "INSERT INTO votings (assembly_id, agenda_numeral, question, options) \
         SELECT $1, $2, $3, $4 \
         WHERE EXISTS (SELECT 1 FROM assemblies WHERE id = $1 AND status = 'in_progress') \
         RETURNING id, assembly_id, agenda_numeral, question, options, status, \
                   total_votes, total_coefficient_voted, opened_at, closed_at",
    )
    .bind(assembly_id)
    .bind(agenda_numeral)
    .bind(question)
    .bind(options_json)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| {
        conflict_on_unique(e, "Another voting is already active for this assembly")
    })?;
    row.map(map_voting).transpose()
}

pub async fn find_by_id(tx: &mut TenantTx, id: i64) -> Result<Option<Voting>, AppError> {
    let row: Option<VotingRow> = sqlx::query_as(&format!("{VOTING_SELECT} WHERE id = $1"))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    row.map(map_voting).transpose()
}

pub async fn find_by_assembly(
    tx: &mut TenantTx,
    assembly_id: i64,
) -> Result<Vec<Voting>, AppError> {
    let rows: Vec<VotingRow> =
        sqlx::query_as(&format!("{VOTING_SELECT} WHERE assembly_id = $1 ORDER BY opened_at, id"))
            .bind(assembly_id)
            .fetch_all(&mut **tx)
            .await?;
    rows.into_iter().map(map_voting).collect()
}

/// Most recent round for an agenda numeral, for the stats-by-numeral lookup.
pub async fn find_by_agenda_numeral(
    tx: &mut TenantTx,
    assembly_id: i64,
    agenda_numeral: i32,
) -> Result<Option<Voting>, AppError> {
    let row: Option<VotingRow> = sqlx::query_as(&format!(
        "{VOTING_SELECT} WHERE assembly_id = $1 AND agenda_numeral = $2 \
         ORDER BY opened_at DESC, id DESC LIMIT 1"
    ))
    .bind(assembly_id)
    .bind(agenda_numeral)
    .fetch_optional(&mut **tx)
    .await?;
    row.map(map_voting).transpose()
}

/// Record one ballot. Runs inside the caller's transaction so the insert
/// and the counter increment commit or roll back together:
///
/// 1. INSERT the vote; the (voting_id, user_id) constraint rejects a
///    concurrent duplicate with Conflict instead of corrupting the tally.
/// 2. Increment the round's counters, conditional on the round still being
///    active; zero rows means the round closed under us and the whole
///    transaction rolls back.
pub async fn cast(
    tx: &mut TenantTx,
    voting_id: i64,
    attendee: &Attendee,
    option_value: &str,
    origin_ip: &str,
    origin_user_agent: &str,
) -> Result<Vote, AppError> {
    let vote = sqlx::query_as::<_, Vote>(
        "INSERT INTO votes (voting_id, user_id, option_value, coefficient, origin_ip, origin_user_agent) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id, voting_id, user_id, option_value, coefficient, cast_at",
    )
    .bind(voting_id)
    .bind(attendee.user_id)
    .bind(option_value)
    .bind(attendee.coefficient)
    .bind(origin_ip)
    .bind(origin_user_agent)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| conflict_on_unique(e, "User has already voted in this round"))?;

    let affected = sqlx::query(
        "UPDATE votings SET total_votes = total_votes + 1, \
                total_coefficient_voted = total_coefficient_voted + $2 \
         WHERE id = $1 AND status = 'active'",
    )
    .bind(voting_id)
    .bind(attendee.coefficient)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    if affected == 0 {
        return Err(AppError::Conflict("Voting is closed".to_string()));
    }

    Ok(vote)
}

/// Per-option vote counts and coefficient sums from the votes table.
pub async fn option_tallies(
    tx: &mut TenantTx,
    voting_id: i64,
) -> Result<Vec<(String, i64, Decimal)>, AppError> {
    let rows: Vec<(String, i64, Decimal)> = sqlx::query_as(
        "SELECT option_value, COUNT(*), COALESCE(SUM(coefficient), 0) \
         FROM votes WHERE voting_id = $1 GROUP BY option_value",
    )
    .bind(voting_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows)
}

/// Conditional close: active -> closed. Returns false when the round was
/// already closed (or never existed), so a racing second close gets Conflict.
pub async fn close(tx: &mut TenantTx, voting_id: i64) -> Result<bool, AppError> {
    let affected = sqlx::query(
        "UPDATE votings SET status = 'closed', closed_at = now() \
         WHERE id = $1 AND status = 'active'",
    )
    .bind(voting_id)
    .execute(&mut **tx)
    .await?
    .rows_affected();
    Ok(affected > 0)
}
