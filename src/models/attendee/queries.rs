use rust_decimal::Decimal;

use super::types::Attendee;
use crate::db::TenantTx;
use crate::errors::{conflict_on_unique, AppError};

const ATTENDEE_SELECT: &str = "SELECT id, assembly_id, user_id, unit_id, coefficient, \
                               delegate_name, registered_at FROM attendees";

/// Insert an attendance record with the unit's coefficient frozen onto it.
/// A second check-in for the same (assembly, user) fails Conflict via the
/// unique constraint.
pub async fn insert(
    tx: &mut TenantTx,
    assembly_id: i64,
    user_id: i64,
    unit_id: i64,
    coefficient: Decimal,
    delegate_name: Option<&str>,
) -> Result<Attendee, AppError> {
    sqlx::query_as::<_, Attendee>(
        "INSERT INTO attendees (assembly_id, user_id, unit_id, coefficient, delegate_name) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, assembly_id, user_id, unit_id, coefficient, delegate_name, registered_at",
    )
    .bind(assembly_id)
    .bind(user_id)
    .bind(unit_id)
    .bind(coefficient)
    .bind(delegate_name)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| conflict_on_unique(e, "User is already registered for this assembly"))
}

pub async fn find(
    tx: &mut TenantTx,
    assembly_id: i64,
    user_id: i64,
) -> Result<Option<Attendee>, AppError> {
    let attendee = sqlx::query_as::<_, Attendee>(&format!(
        "{ATTENDEE_SELECT} WHERE assembly_id = $1 AND user_id = $2"
    ))
    .bind(assembly_id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(attendee)
}

/// Attendance roll in check-in order, for quorum display and the minutes.
pub async fn find_roll(tx: &mut TenantTx, assembly_id: i64) -> Result<Vec<Attendee>, AppError> {
    let roll = sqlx::query_as::<_, Attendee>(&format!(
        "{ATTENDEE_SELECT} WHERE assembly_id = $1 ORDER BY registered_at, id"
    ))
    .bind(assembly_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(roll)
}

/// Sum of all registered coefficients for the assembly; the quorum input
/// and the turnout denominator.
pub async fn total_registered_coefficient(
    tx: &mut TenantTx,
    assembly_id: i64,
) -> Result<Decimal, AppError> {
    let row: (Decimal,) = sqlx::query_as(
        "SELECT COALESCE(SUM(coefficient), 0) FROM attendees WHERE assembly_id = $1",
    )
    .bind(assembly_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row.0)
}
