use super::types::MinutesPayload;
use crate::db::TenantTx;
use crate::errors::AppError;
use crate::models::voting::VotingStats;
use crate::models::{assembly, attendee, voting};

/// Assemble the minutes payload for a completed assembly: header, agenda,
/// attendance roll, and one result snapshot per voting round.
pub async fn build_payload(tx: &mut TenantTx, assembly_id: i64) -> Result<MinutesPayload, AppError> {
    let asm = assembly::find_by_id(tx, assembly_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assembly".to_string()))?;

    let agenda = assembly::find_agenda(tx, assembly_id).await?;
    let roll = attendee::find_roll(tx, assembly_id).await?;
    let registered = attendee::total_registered_coefficient(tx, assembly_id).await?;

    let mut snapshots: Vec<VotingStats> = Vec::new();
    for round in voting::find_by_assembly(tx, assembly_id).await? {
        let tallies = voting::option_tallies(tx, round.id).await?;
        snapshots.push(VotingStats::compute(&round, &tallies, registered));
    }

    MinutesPayload::build(asm, agenda, roll, snapshots, registered)
}
