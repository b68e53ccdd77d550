use chrono::{DateTime, Utc};

use super::types::*;
use crate::db::TenantTx;
use crate::errors::AppError;

#[derive(sqlx::FromRow)]
struct AssemblyRow {
    id: i64,
    complex_id: i64,
    title: String,
    description: String,
    assembly_type: String,
    scheduled_at: DateTime<Utc>,
    location: String,
    status: String,
    created_at: DateTime<Utc>,
}

fn map_assembly(row: AssemblyRow) -> Result<Assembly, AppError> {
    let assembly_type = AssemblyType::parse(&row.assembly_type).ok_or_else(|| {
        AppError::Db(sqlx::Error::Decode(
            format!("unknown assembly_type '{}'", row.assembly_type).into(),
        ))
    })?;
    let status = AssemblyStatus::parse(&row.status).ok_or_else(|| {
        AppError::Db(sqlx::Error::Decode(
            format!("unknown assembly status '{}'", row.status).into(),
        ))
    })?;
    Ok(Assembly {
        id: row.id,
        complex_id: row.complex_id,
        title: row.title,
        description: row.description,
        assembly_type,
        scheduled_at: row.scheduled_at,
        location: row.location,
        status,
        created_at: row.created_at,
    })
}

const ASSEMBLY_SELECT: &str = "SELECT id, complex_id, title, description, assembly_type, \
                               scheduled_at, location, status, created_at FROM assemblies";

/// Insert a new assembly with its agenda. Status starts as 'planned'.
pub async fn create(
    tx: &mut TenantTx,
    complex_id: i64,
    title: &str,
    description: &str,
    assembly_type: AssemblyType,
    scheduled_at: DateTime<Utc>,
    location: &str,
    agenda: &[(i32, String, String, i32)],
) -> Result<i64, AppError> {
    let (assembly_id,): (i64,) = sqlx::query_as(
        "INSERT INTO assemblies (complex_id, title, description, assembly_type, scheduled_at, location) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(complex_id)
    .bind(title)
    .bind(description)
    .bind(assembly_type.as_str())
    .bind(scheduled_at)
    .bind(location)
    .fetch_one(&mut **tx)
    .await?;

    for (numeral, topic, notes, duration_seconds) in agenda {
        sqlx::query(
            "INSERT INTO agenda_items (assembly_id, numeral, topic, notes, duration_seconds) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(assembly_id)
        .bind(numeral)
        .bind(topic)
        .bind(notes)
        .bind(duration_seconds)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            crate::errors::conflict_on_unique(e, &format!("Duplicate agenda numeral {numeral}"))
        })?;
    }

    Ok(assembly_id)
}

pub async fn find_by_id(tx: &mut TenantTx, id: i64) -> Result<Option<Assembly>, AppError> {
    let row: Option<AssemblyRow> = sqlx::query_as(&format!("{ASSEMBLY_SELECT} WHERE id = $1"))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    row.map(map_assembly).transpose()
}

pub async fn find_agenda(tx: &mut TenantTx, assembly_id: i64) -> Result<Vec<AgendaItem>, AppError> {
    let rows: Vec<(i64, i32, String, String, i32)> = sqlx::query_as(
        "SELECT id, numeral, topic, notes, duration_seconds FROM agenda_items \
         WHERE assembly_id = $1 ORDER BY numeral",
    )
    .bind(assembly_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(id, numeral, topic, notes, duration_seconds)| AgendaItem {
            id,
            numeral,
            topic,
            notes,
            duration_seconds,
        })
        .collect())
}

/// Assemblies scheduled at or after the cutoff, soonest first.
pub async fn find_upcoming(
    tx: &mut TenantTx,
    from: DateTime<Utc>,
) -> Result<Vec<AssemblyListItem>, AppError> {
    list_filtered(tx, "WHERE a.scheduled_at >= $1 ORDER BY a.scheduled_at ASC", from).await
}

/// Assemblies scheduled before the cutoff, most recent first.
pub async fn find_past(
    tx: &mut TenantTx,
    before: DateTime<Utc>,
) -> Result<Vec<AssemblyListItem>, AppError> {
    list_filtered(tx, "WHERE a.scheduled_at < $1 ORDER BY a.scheduled_at DESC", before).await
}

async fn list_filtered(
    tx: &mut TenantTx,
    clause: &str,
    cutoff: DateTime<Utc>,
) -> Result<Vec<AssemblyListItem>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        title: String,
        assembly_type: String,
        scheduled_at: DateTime<Utc>,
        status: String,
        agenda_count: i64,
        attendee_count: i64,
    }

    let sql = format!(
        "SELECT a.id, a.title, a.assembly_type, a.scheduled_at, a.status, \
                (SELECT COUNT(*) FROM agenda_items g WHERE g.assembly_id = a.id) AS agenda_count, \
                (SELECT COUNT(*) FROM attendees t WHERE t.assembly_id = a.id) AS attendee_count \
         FROM assemblies a {clause}"
    );
    let rows: Vec<Row> = sqlx::query_as(&sql).bind(cutoff).fetch_all(&mut **tx).await?;

    rows.into_iter()
        .map(|row| {
            let assembly_type = AssemblyType::parse(&row.assembly_type).ok_or_else(|| {
                AppError::Db(sqlx::Error::Decode(
                    format!("unknown assembly_type '{}'", row.assembly_type).into(),
                ))
            })?;
            let status = AssemblyStatus::parse(&row.status).ok_or_else(|| {
                AppError::Db(sqlx::Error::Decode(
                    format!("unknown assembly status '{}'", row.status).into(),
                ))
            })?;
            Ok(AssemblyListItem {
                id: row.id,
                title: row.title,
                assembly_type,
                scheduled_at: row.scheduled_at,
                status,
                agenda_count: row.agenda_count,
                attendee_count: row.attendee_count,
            })
        })
        .collect()
}

/// Update header fields. Conditional on the assembly still being planned;
/// returns false when the state moved on and nothing was written.
pub async fn update_fields(
    tx: &mut TenantTx,
    id: i64,
    title: &str,
    description: &str,
    scheduled_at: DateTime<Utc>,
    location: &str,
) -> Result<bool, AppError> {
    let affected = sqlx::query(
        "UPDATE assemblies SET title = $2, description = $3, scheduled_at = $4, location = $5 \
         WHERE id = $1 AND status = 'planned'",
    )
    .bind(id)
    .bind(title)
    .bind(description)
    .bind(scheduled_at)
    .bind(location)
    .execute(&mut **tx)
    .await?
    .rows_affected();
    Ok(affected > 0)
}

/// Update one agenda item's notes. Notes stay editable while the assembly
/// is planned or in progress; the rest of the agenda is frozen once the
/// assembly leaves planned.
pub async fn update_agenda_notes(
    tx: &mut TenantTx,
    assembly_id: i64,
    numeral: i32,
    notes: &str,
) -> Result<bool, AppError> {
    let affected = sqlx::query(
        "UPDATE agenda_items SET notes = $3 \
         WHERE assembly_id = $1 AND numeral = $2 \
           AND EXISTS (SELECT 1 FROM assemblies a \
                       WHERE a.id = $1 AND a.status IN ('planned', 'in_progress'))",
    )
    .bind(assembly_id)
    .bind(numeral)
    .bind(notes)
    .execute(&mut **tx)
    .await?
    .rows_affected();
    Ok(affected > 0)
}

/// Conditional state transition: only succeeds if the row still holds the
/// expected from-state at write time.
pub async fn transition(
    tx: &mut TenantTx,
    id: i64,
    from: AssemblyStatus,
    to: AssemblyStatus,
) -> Result<bool, AppError> {
    let affected = sqlx::query("UPDATE assemblies SET status = $3 WHERE id = $1 AND status = $2")
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&mut **tx)
        .await?
        .rows_affected();
    Ok(affected > 0)
}

/// Completion transition: additionally requires that no voting round for
/// the assembly is still active, checked in the same statement as the
/// write so a concurrent open cannot slip between check and update.
pub async fn transition_to_completed(tx: &mut TenantTx, id: i64) -> Result<bool, AppError> {
    let affected = sqlx::query(
        "UPDATE assemblies SET status = 'completed' \
         WHERE id = $1 AND status = 'in_progress' \
           AND NOT EXISTS (SELECT 1 FROM votings v \
                           WHERE v.assembly_id = $1 AND v.status = 'active')",
    )
    .bind(id)
    .execute(&mut **tx)
    .await?
    .rows_affected();
    Ok(affected > 0)
}

pub async fn has_active_voting(tx: &mut TenantTx, assembly_id: i64) -> Result<bool, AppError> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM votings WHERE assembly_id = $1 AND status = 'active')",
    )
    .bind(assembly_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row.0)
}

/// Hard delete, only while still planned. Agenda, attendees, votings and
/// votes go with it via ON DELETE CASCADE.
pub async fn delete_planned(tx: &mut TenantTx, id: i64) -> Result<bool, AppError> {
    let affected = sqlx::query("DELETE FROM assemblies WHERE id = $1 AND status = 'planned'")
        .bind(id)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    Ok(affected > 0)
}
