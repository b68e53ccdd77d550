use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Assembly lifecycle states.
///
/// Legal transitions: planned -> in_progress -> completed, with cancelled
/// reachable from planned or in_progress. Completed and cancelled are
/// terminal. Transition legality lives here; the conditional UPDATE in
/// `queries::transition` re-checks the from-state at write time so two
/// administrators cannot race the same edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl AssemblyStatus {
    pub fn parse(value: &str) -> Option<AssemblyStatus> {
        match value {
            "planned" => Some(AssemblyStatus::Planned),
            "in_progress" => Some(AssemblyStatus::InProgress),
            "completed" => Some(AssemblyStatus::Completed),
            "cancelled" => Some(AssemblyStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssemblyStatus::Planned => "planned",
            AssemblyStatus::InProgress => "in_progress",
            AssemblyStatus::Completed => "completed",
            AssemblyStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AssemblyStatus::Completed | AssemblyStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: AssemblyStatus) -> bool {
        use AssemblyStatus::*;
        matches!(
            (self, next),
            (Planned, InProgress) | (InProgress, Completed) | (Planned, Cancelled) | (InProgress, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyType {
    Ordinary,
    Extraordinary,
}

impl AssemblyType {
    pub fn parse(value: &str) -> Option<AssemblyType> {
        match value {
            "ordinary" => Some(AssemblyType::Ordinary),
            "extraordinary" => Some(AssemblyType::Extraordinary),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssemblyType::Ordinary => "ordinary",
            AssemblyType::Extraordinary => "extraordinary",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assembly {
    pub id: i64,
    pub complex_id: i64,
    pub title: String,
    pub description: String,
    pub assembly_type: AssemblyType,
    pub scheduled_at: DateTime<Utc>,
    pub location: String,
    pub status: AssemblyStatus,
    pub created_at: DateTime<Utc>,
}

/// One ordered agenda item. `duration_seconds` feeds the computed assembly
/// end time; notes remain editable after the agenda itself freezes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaItem {
    pub id: i64,
    pub numeral: i32,
    pub topic: String,
    pub notes: String,
    pub duration_seconds: i32,
}

/// For the assembly list view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyListItem {
    pub id: i64,
    pub title: String,
    pub assembly_type: AssemblyType,
    pub scheduled_at: DateTime<Utc>,
    pub status: AssemblyStatus,
    pub agenda_count: i64,
    pub attendee_count: i64,
}

/// Computed assembly end: scheduled start plus the cumulative duration of
/// all agenda items. Gates hard deletion of planned assemblies.
pub fn assembly_end_time(scheduled_at: DateTime<Utc>, agenda: &[AgendaItem]) -> DateTime<Utc> {
    let total: i64 = agenda.iter().map(|item| item.duration_seconds as i64).sum();
    scheduled_at + Duration::seconds(total)
}
