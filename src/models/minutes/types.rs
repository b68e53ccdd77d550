use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::assembly::{AgendaItem, Assembly, AssemblyStatus};
use crate::models::attendee::Attendee;
use crate::models::voting::VotingStats;

/// Structured record handed to the external document renderer: assembly
/// header, ordered agenda, attendance roll with delegate annotations, and
/// every voting round's final snapshot. No rendering happens here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinutesPayload {
    pub assembly: Assembly,
    pub agenda: Vec<AgendaItem>,
    pub attendees: Vec<AttendeeRecord>,
    pub votings: Vec<VotingStats>,
    pub total_registered_coefficient: Decimal,
    pub generated_at: DateTime<Utc>,
}

/// Roll entry for the minutes; carries the proxy name when the vote was
/// delegated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeRecord {
    pub user_id: i64,
    pub unit_id: i64,
    pub coefficient: Decimal,
    pub delegate_name: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl From<Attendee> for AttendeeRecord {
    fn from(a: Attendee) -> Self {
        AttendeeRecord {
            user_id: a.user_id,
            unit_id: a.unit_id,
            coefficient: a.coefficient,
            delegate_name: a.delegate_name,
            registered_at: a.registered_at,
        }
    }
}

impl MinutesPayload {
    /// Compose the minutes record. Minutes cannot be finalized while the
    /// assembly is still running, so anything but `completed` is rejected.
    pub fn build(
        assembly: Assembly,
        agenda: Vec<AgendaItem>,
        attendees: Vec<Attendee>,
        votings: Vec<VotingStats>,
        total_registered_coefficient: Decimal,
    ) -> Result<MinutesPayload, AppError> {
        if assembly.status != AssemblyStatus::Completed {
            return Err(AppError::Conflict(format!(
                "Minutes require a completed assembly; assembly {} is {}",
                assembly.id,
                assembly.status.as_str()
            )));
        }
        Ok(MinutesPayload {
            assembly,
            agenda,
            attendees: attendees.into_iter().map(AttendeeRecord::from).collect(),
            votings,
            total_registered_coefficient,
            generated_at: Utc::now(),
        })
    }
}
